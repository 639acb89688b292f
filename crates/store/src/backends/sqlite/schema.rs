//! SQLite schema definitions and migrations.

use rusqlite::Connection;

use crate::error::{BackendError, StoreResult};

use super::backend::BACKEND_NAME;

/// Current schema version.
pub const SCHEMA_VERSION: i32 = 2;

/// Initialize the database schema.
pub fn initialize_schema(conn: &Connection) -> StoreResult<()> {
    let current_version = get_schema_version(conn)?;

    if current_version == 0 {
        create_schema_v1(conn)?;
        set_schema_version(conn, 1)?;
        migrate_schema(conn, 1)?;
    } else if current_version < SCHEMA_VERSION {
        migrate_schema(conn, current_version)?;
    }

    Ok(())
}

fn get_schema_version(conn: &Connection) -> StoreResult<i32> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER NOT NULL
        )",
        [],
    )
    .map_err(|e| {
        BackendError::internal(BACKEND_NAME, "failed to create schema_version table", e)
    })?;

    let version: Option<i32> = conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
            row.get(0)
        })
        .ok();

    Ok(version.unwrap_or(0))
}

fn set_schema_version(conn: &Connection, version: i32) -> StoreResult<()> {
    conn.execute("DELETE FROM schema_version", [])
        .map_err(|e| BackendError::internal(BACKEND_NAME, "failed to clear schema_version", e))?;

    conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])
        .map_err(|e| BackendError::internal(BACKEND_NAME, "failed to set schema_version", e))?;

    Ok(())
}

fn create_schema_v1(conn: &Connection) -> StoreResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS entities (
            entity_type TEXT NOT NULL,
            id TEXT NOT NULL,
            attributes TEXT NOT NULL,
            PRIMARY KEY (entity_type, id)
        );",
    )
    .map_err(|e| BackendError::internal(BACKEND_NAME, "failed to create entities table", e))?;
    Ok(())
}

fn migrate_schema(conn: &Connection, from_version: i32) -> StoreResult<()> {
    let mut version = from_version;

    if version < 2 {
        // v2: attributes must be valid JSON for json_extract
        conn.execute_batch(
            "CREATE INDEX IF NOT EXISTS idx_entities_type ON entities (entity_type);
             DELETE FROM entities WHERE json_valid(attributes) = 0;",
        )
        .map_err(|e| BackendError::internal(BACKEND_NAME, "migration to v2 failed", e))?;
        version = 2;
        set_schema_version(conn, version)?;
    }

    tracing::debug!(version, "SQLite schema up to date");
    Ok(())
}
