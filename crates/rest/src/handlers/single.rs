//! Single resource handler.

use axum::extract::{OriginalUri, Path, State};
use dicotopo_store::core::EntityStore;
use tracing::debug;

use crate::error::RestResult;
use crate::facade::ResourceFacade;
use crate::pagination::LinkSet;
use crate::responses::{DataDocument, PrimaryData};
use crate::state::RouteContext;

/// Handler for one resource.
///
/// # HTTP Request
///
/// `GET {api}/{type_plural}/{id}`
///
/// # Response
///
/// - `200 OK` - `{data: {...}, links: {self}}`
/// - Object getter status (404 by default) - Identifier not resolved
pub async fn single_handler<S>(
    State(ctx): State<RouteContext<S>>,
    Path(id): Path<String>,
    OriginalUri(uri): OriginalUri,
) -> RestResult<DataDocument>
where
    S: EntityStore + 'static,
{
    debug!(
        resource_type = %ctx.resource_type.name(),
        id = %id,
        "Processing single resource request"
    );

    let entity = ctx
        .getter
        .get(ctx.store.as_ref(), &ctx.resource_type, &id)
        .await?;
    let resource = ResourceFacade::new(&ctx.resource_type, &entity, ctx.urls.api_base()).resource();

    Ok(DataDocument::new(
        PrimaryData::Resource(Box::new(resource)),
        LinkSet::unpaginated(ctx.urls.request_url(&uri)),
    ))
}
