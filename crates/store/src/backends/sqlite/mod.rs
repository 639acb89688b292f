//! SQLite backend.
//!
//! Supports in-memory databases (used by tests) and file databases. Every
//! entity is one row; its attributes are stored as a JSON object and queried
//! with SQLite's JSON functions.
//!
//! # Example
//!
//! ```no_run
//! use dicotopo_store::backends::sqlite::SqliteBackend;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = SqliteBackend::in_memory()?;
//! backend.init_schema()?;
//! # Ok(())
//! # }
//! ```
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE entities (
//!     entity_type TEXT NOT NULL,
//!     id TEXT NOT NULL,
//!     attributes TEXT NOT NULL,  -- JSON object
//!     PRIMARY KEY (entity_type, id)
//! );
//! ```

mod backend;
mod schema;
mod storage;

pub use backend::{SqliteBackend, SqliteBackendConfig};
