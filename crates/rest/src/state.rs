//! State bound to routes at registration.
//!
//! Every resource route owns a [`RouteContext`] naming its store, resource
//! type, object getter and URL configuration, so handlers never reach for
//! global context.

use std::sync::Arc;

use axum::http::Uri;
use dicotopo_store::core::EntityStore;

use crate::config::ServerConfig;
use crate::lookup::ObjectGetter;
use crate::pagination::PageLimits;
use crate::query::QueryOptions;
use crate::schema::{RelationshipDef, ResourceType};

/// State of the service-level routes (health).
pub struct AppState<S> {
    store: Arc<S>,
    config: Arc<ServerConfig>,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            config: Arc::clone(&self.config),
        }
    }
}

impl<S: EntityStore> AppState<S> {
    /// Creates the state.
    pub fn new(store: Arc<S>, config: ServerConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }

    /// Returns the store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

/// The URLs links are built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlConfig {
    link_base: String,
    api_base: String,
}

impl UrlConfig {
    /// Derives the URLs from the server configuration.
    pub fn from_config(config: &ServerConfig) -> Self {
        let link_base = config.link_base().to_string();
        let api_base = format!("{}{}", link_base, config.api_path());
        Self {
            link_base,
            api_base,
        }
    }

    /// Scheme and authority, without a trailing slash.
    pub fn link_base(&self) -> &str {
        &self.link_base
    }

    /// Absolute URL collections hang off.
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Absolute URL of the request path, without its query.
    pub fn request_base(&self, uri: &Uri) -> String {
        format!("{}{}", self.link_base, uri.path())
    }

    /// Absolute URL of the request, raw query included.
    pub fn request_url(&self, uri: &Uri) -> String {
        match uri.query() {
            Some(query) if !query.is_empty() => format!("{}?{}", self.request_base(uri), query),
            _ => self.request_base(uri),
        }
    }
}

/// State of the collection and single-resource routes of one type.
pub struct RouteContext<S> {
    /// The store.
    pub store: Arc<S>,
    /// The routed type.
    pub resource_type: Arc<ResourceType>,
    /// Resolves `{id}` path segments.
    pub getter: Arc<dyn ObjectGetter<S>>,
    /// Link URLs.
    pub urls: Arc<UrlConfig>,
    /// Filter and sort combination modes.
    pub options: QueryOptions,
    /// Page limits of the routed type.
    pub limits: PageLimits,
}

impl<S> Clone for RouteContext<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            resource_type: Arc::clone(&self.resource_type),
            getter: Arc::clone(&self.getter),
            urls: Arc::clone(&self.urls),
            options: self.options,
            limits: self.limits,
        }
    }
}

/// State of the two routes of one relationship.
pub struct RelationshipContext<S> {
    /// The owner's route state.
    pub route: RouteContext<S>,
    /// The relationship.
    pub relationship: Arc<RelationshipDef>,
    /// The related type.
    pub target: Arc<ResourceType>,
}

impl<S> Clone for RelationshipContext<S> {
    fn clone(&self) -> Self {
        Self {
            route: self.route.clone(),
            relationship: Arc::clone(&self.relationship),
            target: Arc::clone(&self.target),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_config() {
        let config = ServerConfig {
            base_url: "https://dicotopo.example.org/".to_string(),
            ..ServerConfig::default()
        };
        let urls = UrlConfig::from_config(&config);
        assert_eq!(urls.link_base(), "https://dicotopo.example.org");
        assert_eq!(urls.api_base(), "https://dicotopo.example.org/dico-topo/api/1.0");

        let uri: Uri = "/dico-topo/api/1.0/places?page%5Bsize%5D=2".parse().unwrap();
        assert_eq!(
            urls.request_base(&uri),
            "https://dicotopo.example.org/dico-topo/api/1.0/places"
        );
        assert_eq!(
            urls.request_url(&uri),
            "https://dicotopo.example.org/dico-topo/api/1.0/places?page%5Bsize%5D=2"
        );
    }

    #[test]
    fn test_empty_prefix() {
        let config = ServerConfig {
            url_prefix: String::new(),
            ..ServerConfig::for_testing()
        };
        let urls = UrlConfig::from_config(&config);
        assert_eq!(urls.api_base(), "http://localhost/api/1.0");
    }
}
