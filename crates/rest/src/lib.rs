//! # dicotopo-rest - JSON:API read service
//!
//! This crate exposes the entities of a [`dicotopo_store`] backend as a
//! read-only [JSON:API](https://jsonapi.org/format/) service. Resource
//! types are declared in a [`ResourceRegistry`]; every declared type gets
//! collection, single-resource and relationship routes with filtering,
//! sorting and page-based pagination.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use dicotopo_rest::{create_app, ServerConfig};
//! use dicotopo_rest::schema::{FieldDef, ResourceRegistry, ResourceType};
//! use dicotopo_store::backends::memory::MemoryBackend;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let registry = ResourceRegistry::new()
//!         .with(ResourceType::new("place", "places").with_field(FieldDef::text("label")))?;
//!
//!     let config = ServerConfig::default();
//!     let app = create_app(MemoryBackend::new(), registry, config)?;
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## API Endpoints
//!
//! Paths hang off `{url_prefix}/api/{api_version}`:
//!
//! | Route | URL Pattern |
//! |-------|-------------|
//! | collection | `GET /{type_plural}` |
//! | single | `GET /{type_plural}/{id}` |
//! | linkage | `GET /{type_plural}/{id}/relationships/{rel}` |
//! | related | `GET /{type_plural}/{id}/{rel}` |
//! | health | `GET /health` (unprefixed) |
//!
//! Collections accept `filter[<field>]=v1,v2` (repeatable), `sort=f1,-f2`,
//! `page[number]=N` and `page[size]=N`; to-many relationship routes accept
//! the page parameters.
//!
//! ## Error Handling
//!
//! Errors are returned as `{"errors": [{"status", "details"}]}` documents:
//!
//! | HTTP Status | Description |
//! |-------------|-------------|
//! | 400 | Bad filter, sort or page parameter; store failure |
//! | 404 | Resource not found; undeclared relationship |
//! | 500 | Internal error |
//!
//! ## Architecture
//!
//! - [`config`] - Server configuration
//! - [`schema`] - Resource type declarations and the registry
//! - [`query`] - Filter and sort parameter parsing
//! - [`pagination`] - Page arithmetic and pagination links
//! - [`facade`] - Resource objects derived from stored entities
//! - [`relationships`] - Relationship resolution
//! - [`lookup`] - Object getters resolving `{id}` segments
//! - [`handlers`] - HTTP request handlers
//! - [`routing`] - Route registration
//! - [`responses`] - JSON:API documents
//! - [`error`] - Error types and error documents

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod error;
pub mod facade;
pub mod handlers;
pub mod lookup;
pub mod pagination;
pub mod query;
pub mod relationships;
pub mod responses;
pub mod routing;
pub mod schema;
pub mod state;

pub use config::ServerConfig;
pub use error::{RestError, RestResult};
pub use lookup::{LookupFailure, ObjectGetter, StoreObjectGetter};
pub use routing::RouteRegistrar;
pub use schema::{RegistryError, ResourceRegistry};
pub use state::AppState;

use std::sync::Arc;
use std::time::Duration;

use axum::{Router, http::StatusCode, routing::get};
use dicotopo_store::core::EntityStore;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

/// Creates the application serving every type of `registry`.
///
/// The registry is validated first; declaration errors are returned
/// before any route is built.
pub fn create_app<S>(
    store: S,
    registry: ResourceRegistry,
    config: ServerConfig,
) -> Result<Router, RegistryError>
where
    S: EntityStore + 'static,
{
    registry.validate()?;
    let store = Arc::new(store);
    let registry = Arc::new(registry);

    info!(
        backend = %store.backend_name(),
        resource_types = registry.len(),
        api_path = %config.api_path(),
        "Creating JSON:API server"
    );

    let router = RouteRegistrar::new(Arc::clone(&store), registry, &config)
        .register_all()?
        .into_router();
    Ok(with_middleware(router, store, config))
}

/// Adds the health route and the middleware stack to a router of resource
/// routes, e.g. one built with custom object getters.
pub fn with_middleware<S>(router: Router, store: Arc<S>, config: ServerConfig) -> Router
where
    S: EntityStore + 'static,
{
    let enable_cors = config.enable_cors;
    let enable_request_id = config.enable_request_id;
    let cors = build_cors_layer(&config);
    let timeout = Duration::from_secs(config.request_timeout);

    let router = router.route(
        "/health",
        get(handlers::health_handler::<S>).with_state(AppState::new(store, config)),
    );

    let service_builder = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            timeout,
        ));

    let router = if enable_cors {
        router.layer(cors)
    } else {
        router
    };

    let router = router.layer(service_builder);

    if enable_request_id {
        router
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    } else {
        router
    }
}

/// Builds the CORS layer based on configuration.
fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if config.cors_origins == "*" {
        cors.allow_origin(Any)
    } else {
        let origins: Vec<_> = config
            .cors_origins
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors.allow_origin(origins)
    }
}

/// Initializes the tracing subscriber for logging.
///
/// `RUST_LOG` takes precedence over `level` when set. Call once at
/// startup.
pub fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("dicotopo_rest={},tower_http=debug", level)));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}
