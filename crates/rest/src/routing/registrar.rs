//! Route registration for resource types.
//!
//! The registrar owns the store, the type registry and the URL
//! configuration, and binds them into the state of every route it adds.
//! For a type with plural `places` mounted under `/dico-topo/api/1.0`:
//!
//! - `GET /dico-topo/api/1.0/places` - collection
//! - `GET /dico-topo/api/1.0/places/{id}` - single resource
//! - `GET /dico-topo/api/1.0/places/{id}/relationships/{rel}` - linkage
//! - `GET /dico-topo/api/1.0/places/{id}/{rel}` - related resources
//!
//! Each declared relationship gets literal routes, which take precedence
//! over the `{rel}` captures answering 404 for undeclared names.

use std::sync::Arc;

use axum::{Router, routing::get};
use dicotopo_store::core::EntityStore;
use tracing::debug;

use crate::config::ServerConfig;
use crate::handlers;
use crate::lookup::{ObjectGetter, StoreObjectGetter};
use crate::pagination::PageLimits;
use crate::query::QueryOptions;
use crate::schema::{RegistryError, ResourceRegistry};
use crate::state::{RelationshipContext, RouteContext, UrlConfig};

/// Builds the resource routes of a registry.
pub struct RouteRegistrar<S> {
    store: Arc<S>,
    registry: Arc<ResourceRegistry>,
    urls: Arc<UrlConfig>,
    api_path: String,
    options: QueryOptions,
    limits: PageLimits,
    router: Router,
}

impl<S> RouteRegistrar<S>
where
    S: EntityStore + 'static,
{
    /// Creates a registrar with no routes.
    pub fn new(store: Arc<S>, registry: Arc<ResourceRegistry>, config: &ServerConfig) -> Self {
        Self {
            store,
            registry,
            urls: Arc::new(UrlConfig::from_config(config)),
            api_path: config.api_path(),
            options: config.query_options(),
            limits: config.page_limits(),
            router: Router::new(),
        }
    }

    fn context(
        &self,
        type_name: &str,
        getter: Arc<dyn ObjectGetter<S>>,
    ) -> Result<RouteContext<S>, RegistryError> {
        let resource_type = self
            .registry
            .get(type_name)
            .cloned()
            .ok_or_else(|| RegistryError::NotRegistered(type_name.to_string()))?;
        Ok(RouteContext {
            store: Arc::clone(&self.store),
            limits: resource_type.page_limits_or(self.limits),
            resource_type,
            getter,
            urls: Arc::clone(&self.urls),
            options: self.options,
        })
    }

    fn type_path(&self, plural: &str) -> String {
        format!("{}/{}", self.api_path, plural)
    }

    /// Adds the collection and single-resource routes of a type, plus the
    /// 404 fallbacks for undeclared relationship names.
    pub fn register_get_routes(
        mut self,
        type_name: &str,
        getter: Arc<dyn ObjectGetter<S>>,
    ) -> Result<Self, RegistryError> {
        let ctx = self.context(type_name, getter)?;
        let base = self.type_path(ctx.resource_type.plural());
        debug!(resource_type = %type_name, path = %base, "Registering resource routes");

        self.router = self
            .router
            .route(
                &base,
                get(handlers::collection_handler::<S>).with_state(ctx.clone()),
            )
            .route(
                &format!("{}/{{id}}", base),
                get(handlers::single_handler::<S>).with_state(ctx.clone()),
            )
            .route(
                &format!("{}/{{id}}/relationships/{{relationship}}", base),
                get(handlers::unknown_relationship_handler::<S>).with_state(ctx.clone()),
            )
            .route(
                &format!("{}/{{id}}/{{relationship}}", base),
                get(handlers::unknown_relationship_handler::<S>).with_state(ctx),
            );
        Ok(self)
    }

    /// Adds the linkage and related-resources routes of one relationship.
    pub fn register_relationship_get_route(
        mut self,
        type_name: &str,
        relationship: &str,
        getter: Arc<dyn ObjectGetter<S>>,
    ) -> Result<Self, RegistryError> {
        let route = self.context(type_name, getter)?;
        let def = route
            .resource_type
            .relationship(relationship)
            .cloned()
            .ok_or_else(|| {
                RegistryError::NotRegistered(format!("{}.{}", type_name, relationship))
            })?;
        let target = self
            .registry
            .get(&def.target_type)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownTarget {
                resource_type: type_name.to_string(),
                relationship: relationship.to_string(),
                target: def.target_type.clone(),
            })?;

        let base = self.type_path(route.resource_type.plural());
        debug!(
            resource_type = %type_name,
            relationship = %relationship,
            target = %target.name(),
            "Registering relationship routes"
        );

        let ctx = RelationshipContext {
            route,
            relationship: Arc::new(def),
            target,
        };
        self.router = self
            .router
            .route(
                &format!("{}/{{id}}/relationships/{}", base, relationship),
                get(handlers::linkage_handler::<S>).with_state(ctx.clone()),
            )
            .route(
                &format!("{}/{{id}}/{}", base, relationship),
                get(handlers::related_handler::<S>).with_state(ctx),
            );
        Ok(self)
    }

    /// Registers every type of the registry and all of its relationships
    /// with the default object getter.
    pub fn register_all(self) -> Result<Self, RegistryError> {
        let getter: Arc<dyn ObjectGetter<S>> = Arc::new(StoreObjectGetter);
        let registry = Arc::clone(&self.registry);

        let mut registrar = self;
        for resource_type in registry.iter() {
            registrar = registrar.register_get_routes(resource_type.name(), Arc::clone(&getter))?;
            for relationship in resource_type.relationships() {
                registrar = registrar.register_relationship_get_route(
                    resource_type.name(),
                    &relationship.name,
                    Arc::clone(&getter),
                )?;
            }
        }
        Ok(registrar)
    }

    /// Returns the router holding every registered route.
    pub fn into_router(self) -> Router {
        self.router
    }
}
