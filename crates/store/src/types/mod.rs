//! Core types for stored entities and queries.

mod entity;
mod query;

pub use entity::StoredEntity;
pub use query::{EntityQuery, FieldValue, Predicate, Slice, SortDirection, SortKey};
