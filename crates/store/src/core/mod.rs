//! Store traits.
//!
//! - [`EntityStore`] - filter, sort, count, slice and lookup by id
//! - [`EntityWriter`] - upsert, used to load data

mod storage;

pub use storage::{EntityStore, EntityWriter, validate_query};
