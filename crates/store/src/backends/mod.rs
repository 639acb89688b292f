//! Store backend implementations.
//!
//! | Backend | Feature | Description |
//! |---------|---------|-------------|
//! | Memory | always | Ordered maps behind a lock, for tests and fixtures |
//! | SQLite | `sqlite` | Embedded database with in-memory and file modes |

pub mod memory;

#[cfg(feature = "sqlite")]
pub mod sqlite;
