//! Collection handler.
//!
//! `GET {api}/{type_plural}` with optional `filter[...]`, `sort` and
//! `page[...]` parameters.

use axum::extract::{OriginalUri, State};
use dicotopo_store::core::EntityStore;
use dicotopo_store::types::EntityQuery;
use tracing::debug;

use crate::error::RestResult;
use crate::facade::ResourceFacade;
use crate::pagination::{LinkSet, Page, PageRequest};
use crate::query::{FilterSpec, QueryParams, SortSpec};
use crate::responses::{DataDocument, PrimaryData};
use crate::state::RouteContext;

/// Handler for a resource type collection.
///
/// Every query parameter is parsed before the store is touched, so a bad
/// parameter never yields partial data.
///
/// # HTTP Request
///
/// `GET {api}/{type_plural}?filter[field]=v1,v2&sort=f1,-f2&page[number]=N&page[size]=N`
///
/// # Response
///
/// - `200 OK` - `{data: [...], links}`; paginated when any `page[...]`
///   parameter is present
/// - `400 Bad Request` - Unknown field, bad value, bad page parameter, or
///   store failure
pub async fn collection_handler<S>(
    State(ctx): State<RouteContext<S>>,
    OriginalUri(uri): OriginalUri,
    params: QueryParams,
) -> RestResult<DataDocument>
where
    S: EntityStore + 'static,
{
    let resource_type = &ctx.resource_type;
    debug!(
        resource_type = %resource_type.name(),
        params = %params.to_query_string(),
        "Processing collection request"
    );

    let filter = FilterSpec::parse(&params, resource_type)?;
    let sort = SortSpec::parse(&params, resource_type, ctx.options.sort_direction)?;
    let page_request = PageRequest::from_params(&params, ctx.limits)?;

    let mut query = EntityQuery::new(resource_type.name());
    for predicate in filter.to_predicates(ctx.options.filter_values) {
        query = query.with_predicate(predicate);
    }
    for key in sort.into_keys() {
        query = query.with_sort(key);
    }

    let (entities, links) = match page_request {
        None => (
            ctx.store.fetch(&query, None).await?,
            LinkSet::unpaginated(ctx.urls.request_url(&uri)),
        ),
        Some(request) => {
            let total = ctx.store.count(&query).await?;
            let page = Page::new(request, total);
            debug!(
                total,
                number = page.number(),
                size = page.size(),
                page_count = page.page_count(),
                "Paginating collection"
            );
            let entities = if page.is_empty() {
                Vec::new()
            } else {
                ctx.store.fetch(&query, Some(page.slice())).await?
            };
            (entities, page.links(&ctx.urls.request_base(&uri), &params))
        }
    };

    let resources = entities
        .iter()
        .map(|entity| ResourceFacade::new(resource_type, entity, ctx.urls.api_base()).resource())
        .collect();

    Ok(DataDocument::new(PrimaryData::Resources(resources), links))
}
