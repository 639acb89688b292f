//! Dicotopo entity store.
//!
//! This crate persists the gazetteer's entities and answers the queries the
//! JSON:API layer issues: equality filters, multi-key sorts, counts and
//! offset/limit slices over one entity type, plus lookups by identifier.
//!
//! # Architecture
//!
//! - [`types`] - stored entities and the query model
//! - [`core`] - the [`EntityStore`] and [`EntityWriter`] traits
//! - [`error`] - error types for all operations
//! - [`backends`] - in-memory and SQLite implementations
//!
//! # Quick Start
//!
//! ```
//! use dicotopo_store::backends::memory::MemoryBackend;
//! use dicotopo_store::types::{EntityQuery, FieldValue, Predicate, SortKey, StoredEntity};
//! use serde_json::json;
//!
//! let store = MemoryBackend::with_entities(vec![
//!     StoredEntity::from_json("place", "P1", json!({"label": "Ain", "dpt": "01"})).unwrap(),
//! ]);
//!
//! let query = EntityQuery::new("place")
//!     .with_predicate(Predicate::equals("dpt", FieldValue::Text("01".into())))
//!     .with_sort(SortKey::asc("label"));
//! assert_eq!(query.predicates.len(), 1);
//! assert!(!store.is_empty());
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod backends;
pub mod core;
pub mod error;
pub mod types;

pub use core::{EntityStore, EntityWriter};
pub use error::{StoreError, StoreResult};
pub use types::{EntityQuery, StoredEntity};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
