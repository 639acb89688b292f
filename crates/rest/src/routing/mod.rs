//! Route configuration.
//!
//! Maps resource types of a [`crate::schema::ResourceRegistry`] to HTTP
//! paths and handlers.

pub mod registrar;

pub use registrar::RouteRegistrar;
