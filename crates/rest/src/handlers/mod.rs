//! HTTP request handlers.
//!
//! - [`collection`] - List a resource type with filter, sort and pagination
//! - [`single`] - Read one resource
//! - [`relationship`] - Relationship linkage and related resources
//! - [`health`] - Health check endpoint

pub mod collection;
pub mod health;
pub mod relationship;
pub mod single;

pub use collection::collection_handler;
pub use health::health_handler;
pub use relationship::{linkage_handler, related_handler, unknown_relationship_handler};
pub use single::single_handler;
