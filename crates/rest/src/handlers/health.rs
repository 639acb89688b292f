//! Health check endpoint handler.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use dicotopo_store::core::EntityStore;
use tracing::debug;

use crate::state::AppState;

/// Handler for the health check endpoint.
///
/// # HTTP Request
///
/// `GET /health`
///
/// # Response
///
/// - `200 OK` - `{"status": "healthy", "backend": "<name>"}`
pub async fn health_handler<S>(State(state): State<AppState<S>>) -> Response
where
    S: EntityStore + 'static,
{
    debug!("Processing health check request");

    let health_response = serde_json::json!({
        "status": "healthy",
        "backend": state.store().backend_name(),
    });

    (StatusCode::OK, Json(health_response)).into_response()
}
