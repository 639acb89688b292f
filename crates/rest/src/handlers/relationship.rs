//! Relationship handlers.
//!
//! Each declared relationship `rel` of a type gets two routes:
//!
//! - `GET {api}/{type_plural}/{id}/relationships/{rel}` - linkage, the
//!   identifiers of the related resources
//! - `GET {api}/{type_plural}/{id}/{rel}` - the related resources
//!
//! To-many relationships paginate when a `page[...]` parameter is present;
//! to-one relationships ignore page parameters. Undeclared names fall
//! through to [`unknown_relationship_handler`].

use axum::extract::{OriginalUri, Path, State};
use dicotopo_store::core::EntityStore;
use dicotopo_store::types::StoredEntity;
use tracing::debug;

use crate::error::{RestError, RestResult};
use crate::facade::{RelationshipView, ResourceFacade};
use crate::pagination::{LinkSet, Page, PageRequest};
use crate::query::{QueryParams, make_url};
use crate::relationships::RelationshipResolver;
use crate::responses::{DataDocument, PrimaryData};
use crate::state::{RelationshipContext, RouteContext};

/// Resolves the owner and the page requested for the relationship.
async fn prepare<S>(
    ctx: &RelationshipContext<S>,
    id: &str,
    params: &QueryParams,
) -> RestResult<(StoredEntity, Option<PageRequest>)>
where
    S: EntityStore + 'static,
{
    let route = &ctx.route;
    debug!(
        resource_type = %route.resource_type.name(),
        id = %id,
        relationship = %ctx.relationship.name,
        params = %params.to_query_string(),
        "Processing relationship request"
    );

    // Page parameters are validated even when the owner is missing.
    let page_request = if ctx.relationship.is_to_many() {
        PageRequest::from_params(params, route.limits)?
    } else {
        None
    };

    let owner = route
        .getter
        .get(route.store.as_ref(), &route.resource_type, id)
        .await?;
    Ok((owner, page_request))
}

fn relationship_view<'a, S>(
    ctx: &'a RelationshipContext<S>,
    owner: &'a StoredEntity,
) -> RestResult<RelationshipView<'a>> {
    let route = &ctx.route;
    ResourceFacade::new(&route.resource_type, owner, route.urls.api_base())
        .relationship(&ctx.relationship.name)
        .ok_or_else(|| RestError::InternalError {
            message: format!(
                "relationship '{}' is routed but not declared on {}",
                ctx.relationship.name,
                route.resource_type.name()
            ),
        })
}

/// Handler for relationship linkage.
///
/// # HTTP Request
///
/// `GET {api}/{type_plural}/{id}/relationships/{rel}`
///
/// # Response
///
/// - `200 OK` - `{links: {self, related, ...}, data}`; `data` is an
///   identifier array for to-many relationships, an identifier or `null`
///   for to-one relationships
/// - `400 Bad Request` - Bad page parameter or store failure
/// - Object getter status (404 by default) - Owner not resolved
pub async fn linkage_handler<S>(
    State(ctx): State<RelationshipContext<S>>,
    Path(id): Path<String>,
    params: QueryParams,
) -> RestResult<DataDocument>
where
    S: EntityStore + 'static,
{
    let (owner, page_request) = prepare(&ctx, &id, &params).await?;
    let view = relationship_view(&ctx, &owner)?;
    let resolver = RelationshipResolver::new(
        ctx.route.store.as_ref(),
        &ctx.relationship,
        &owner,
        &ctx.target,
    );

    if !ctx.relationship.is_to_many() {
        let data = match resolver.identifiers(None).await?.into_iter().next() {
            Some(identifier) => PrimaryData::Identifier(identifier),
            None => PrimaryData::Null,
        };
        return Ok(DataDocument::new(data, view.links()));
    }

    match page_request {
        None => {
            let identifiers = resolver.identifiers(None).await?;
            Ok(DataDocument::new(
                PrimaryData::Identifiers(identifiers),
                view.links(),
            ))
        }
        Some(request) => {
            let page = Page::new(request, resolver.count().await?);
            let identifiers = resolver.identifiers(Some(&page)).await?;
            let related = make_url(&view.related_url(), &page.params_for(&params, page.number()));
            let links = view
                .links()
                .merge(page.links(&view.self_url(), &params))
                .merge(LinkSet {
                    related: Some(related),
                    ..Default::default()
                });
            Ok(DataDocument::new(PrimaryData::Identifiers(identifiers), links))
        }
    }
}

/// Handler for related resources.
///
/// # HTTP Request
///
/// `GET {api}/{type_plural}/{id}/{rel}`
///
/// # Response
///
/// - `200 OK` - `{links, data}`; `data` is a resource array for to-many
///   relationships, a resource or `null` for to-one relationships
/// - `400 Bad Request` - Bad page parameter or store failure
/// - Object getter status (404 by default) - Owner not resolved
pub async fn related_handler<S>(
    State(ctx): State<RelationshipContext<S>>,
    Path(id): Path<String>,
    OriginalUri(uri): OriginalUri,
    params: QueryParams,
) -> RestResult<DataDocument>
where
    S: EntityStore + 'static,
{
    let (owner, page_request) = prepare(&ctx, &id, &params).await?;
    let route = &ctx.route;
    let resolver =
        RelationshipResolver::new(route.store.as_ref(), &ctx.relationship, &owner, &ctx.target);
    let to_resource =
        |entity: &StoredEntity| ResourceFacade::new(&ctx.target, entity, route.urls.api_base()).resource();

    if !ctx.relationship.is_to_many() {
        let data = match resolver.resources(None).await?.first() {
            Some(entity) => PrimaryData::Resource(Box::new(to_resource(entity))),
            None => PrimaryData::Null,
        };
        return Ok(DataDocument::new(
            data,
            LinkSet::unpaginated(route.urls.request_url(&uri)),
        ));
    }

    let (entities, links) = match page_request {
        None => (
            resolver.resources(None).await?,
            LinkSet::unpaginated(route.urls.request_url(&uri)),
        ),
        Some(request) => {
            let page = Page::new(request, resolver.count().await?);
            (
                resolver.resources(Some(&page)).await?,
                page.links(&route.urls.request_base(&uri), &params),
            )
        }
    };

    Ok(DataDocument::new(
        PrimaryData::Resources(entities.iter().map(to_resource).collect()),
        links,
    ))
}

/// Handler for relationship names not declared on the type.
///
/// # Response
///
/// - `404 Not Found` - Always
pub async fn unknown_relationship_handler<S>(
    State(ctx): State<RouteContext<S>>,
    Path((id, relationship)): Path<(String, String)>,
) -> RestResult<DataDocument>
where
    S: EntityStore + 'static,
{
    debug!(
        resource_type = %ctx.resource_type.name(),
        id = %id,
        relationship = %relationship,
        "Unknown relationship requested"
    );
    Err(RestError::UnknownRelationship {
        resource_type: ctx.resource_type.name().to_string(),
        relationship,
    })
}
