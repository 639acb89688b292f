//! [`EntityStore`] and [`EntityWriter`] for SQLite.
//!
//! Attributes live in a JSON text column and are addressed with
//! `json_extract`. Attribute paths are bound as parameters, never spliced
//! into the statement text.

use std::collections::HashMap;

use async_trait::async_trait;
use rusqlite::types::Value as SqlValue;
use rusqlite::{Row, params_from_iter};

use crate::core::{EntityStore, EntityWriter, validate_query};
use crate::error::{BackendError, StoreError, StoreResult};
use crate::types::{EntityQuery, FieldValue, Predicate, Slice, StoredEntity};

use super::backend::{BACKEND_NAME, SqliteBackend};

const READ_MANY_CHUNK: usize = 500;

/// A statement fragment with its positional parameters.
struct SqlFragment {
    sql: String,
    params: Vec<SqlValue>,
}

fn json_path(field: &str) -> SqlValue {
    SqlValue::Text(format!("$.\"{}\"", field))
}

/// Expression reading an attribute; `id` falls back to the key column.
fn field_expr(field: &str, params: &mut Vec<SqlValue>) -> &'static str {
    params.push(json_path(field));
    if field == "id" {
        "COALESCE(json_extract(attributes, ?), id)"
    } else {
        "json_extract(attributes, ?)"
    }
}

/// Expression reading an attribute's JSON type; a missing `id` attribute is
/// the text key column.
fn type_expr(field: &str, params: &mut Vec<SqlValue>) -> &'static str {
    params.push(json_path(field));
    if field == "id" {
        "COALESCE(json_type(attributes, ?), 'text')"
    } else {
        "json_type(attributes, ?)"
    }
}

fn bind_value(value: &FieldValue) -> SqlValue {
    match value {
        FieldValue::Text(s) => SqlValue::Text(s.clone()),
        FieldValue::Integer(n) => SqlValue::Integer(*n),
        // json_extract yields 1/0 for JSON true/false
        FieldValue::Boolean(b) => SqlValue::Integer(i64::from(*b)),
    }
}

/// `json_type` names accepted for a value's kind. JSON `true` and `1` both
/// extract as the integer 1, so equality alone is not enough.
fn json_types(value: &FieldValue) -> &'static str {
    match value {
        FieldValue::Text(_) => "'text'",
        FieldValue::Integer(_) => "'integer'",
        FieldValue::Boolean(_) => "'true', 'false'",
    }
}

fn value_match(field: &str, value: &FieldValue, params: &mut Vec<SqlValue>) -> String {
    let expr = field_expr(field, params);
    params.push(bind_value(value));
    let kind = type_expr(field, params);
    format!("({} = ? AND {} IN ({}))", expr, kind, json_types(value))
}

fn where_clause(query: &EntityQuery) -> SqlFragment {
    let mut params = vec![SqlValue::Text(query.entity_type.clone())];
    let mut sql = String::from("WHERE entity_type = ?");

    for predicate in &query.predicates {
        match predicate {
            Predicate::Equals { field, value } => {
                let term = value_match(field, value, &mut params);
                sql.push_str(&format!(" AND {}", term));
            }
            Predicate::AnyOf { values, .. } if values.is_empty() => sql.push_str(" AND 0"),
            Predicate::AnyOf { field, values } => {
                let terms: Vec<String> = values
                    .iter()
                    .map(|value| value_match(field, value, &mut params))
                    .collect();
                sql.push_str(&format!(" AND ({})", terms.join(" OR ")));
            }
        }
    }

    SqlFragment { sql, params }
}

fn order_clause(query: &EntityQuery) -> SqlFragment {
    let mut params = Vec::new();
    let mut terms = Vec::with_capacity(query.sort.len() + 1);
    for key in &query.sort {
        let expr = field_expr(&key.field, &mut params);
        terms.push(format!("{} {}", expr, key.direction.as_sql()));
    }
    terms.push("id ASC".to_string());
    SqlFragment {
        sql: format!("ORDER BY {}", terms.join(", ")),
        params,
    }
}

fn raw_row(row: &Row<'_>) -> rusqlite::Result<(String, String)> {
    Ok((row.get(0)?, row.get(1)?))
}

fn decode(entity_type: &str, id: String, attributes: &str) -> StoreResult<StoredEntity> {
    let value: serde_json::Value = serde_json::from_str(attributes)?;
    StoredEntity::from_json(entity_type, id.clone(), value).ok_or_else(|| {
        StoreError::Serialization {
            message: format!("attributes of {}/{} are not a JSON object", entity_type, id),
        }
    })
}

fn query_failed(e: rusqlite::Error) -> StoreError {
    let message = format!("query failed: {}", e);
    BackendError::internal(BACKEND_NAME, message, e).into()
}

fn to_i64(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

impl SqliteBackend {
    fn select_rows(
        &self,
        sql: &str,
        params: Vec<SqlValue>,
        entity_type: &str,
    ) -> StoreResult<Vec<StoredEntity>> {
        let conn = self.get_connection()?;
        let mut stmt = conn.prepare(sql).map_err(query_failed)?;
        let rows = stmt
            .query_map(params_from_iter(params), raw_row)
            .map_err(query_failed)?;

        let mut entities = Vec::new();
        for row in rows {
            let (id, attributes) = row.map_err(query_failed)?;
            entities.push(decode(entity_type, id, &attributes)?);
        }
        Ok(entities)
    }
}

#[async_trait]
impl EntityStore for SqliteBackend {
    fn backend_name(&self) -> &'static str {
        BACKEND_NAME
    }

    async fn read(&self, entity_type: &str, id: &str) -> StoreResult<Option<StoredEntity>> {
        let found = self.select_rows(
            "SELECT id, attributes FROM entities WHERE entity_type = ? AND id = ?",
            vec![
                SqlValue::Text(entity_type.to_string()),
                SqlValue::Text(id.to_string()),
            ],
            entity_type,
        )?;
        Ok(found.into_iter().next())
    }

    async fn read_many(&self, entity_type: &str, ids: &[String]) -> StoreResult<Vec<StoredEntity>> {
        let mut by_id = HashMap::with_capacity(ids.len());
        for chunk in ids.chunks(READ_MANY_CHUNK) {
            let placeholders = vec!["?"; chunk.len()].join(", ");
            let sql = format!(
                "SELECT id, attributes FROM entities WHERE entity_type = ? AND id IN ({})",
                placeholders
            );
            let mut params = vec![SqlValue::Text(entity_type.to_string())];
            params.extend(chunk.iter().map(|id| SqlValue::Text(id.clone())));
            for entity in self.select_rows(&sql, params, entity_type)? {
                by_id.insert(entity.id().to_string(), entity);
            }
        }
        Ok(ids.iter().filter_map(|id| by_id.get(id).cloned()).collect())
    }

    async fn count(&self, query: &EntityQuery) -> StoreResult<u64> {
        validate_query(query)?;
        let filter = where_clause(query);
        let sql = format!("SELECT COUNT(*) FROM entities {}", filter.sql);

        let conn = self.get_connection()?;
        let count: i64 = conn
            .query_row(&sql, params_from_iter(filter.params), |row| row.get(0))
            .map_err(query_failed)?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    async fn fetch(
        &self,
        query: &EntityQuery,
        slice: Option<Slice>,
    ) -> StoreResult<Vec<StoredEntity>> {
        validate_query(query)?;
        let filter = where_clause(query);
        let order = order_clause(query);

        let mut sql = format!(
            "SELECT id, attributes FROM entities {} {}",
            filter.sql, order.sql
        );
        let mut params = filter.params;
        params.extend(order.params);
        if let Some(slice) = slice {
            sql.push_str(" LIMIT ? OFFSET ?");
            params.push(SqlValue::Integer(to_i64(slice.limit)));
            params.push(SqlValue::Integer(to_i64(slice.offset)));
        }

        tracing::trace!(sql = %sql, "Executing entity query");
        self.select_rows(&sql, params, &query.entity_type)
    }
}

#[async_trait]
impl EntityWriter for SqliteBackend {
    async fn insert(&self, entity: StoredEntity) -> StoreResult<()> {
        let attributes = serde_json::to_string(entity.attributes())?;
        let conn = self.get_connection()?;
        conn.execute(
            "INSERT OR REPLACE INTO entities (entity_type, id, attributes) VALUES (?1, ?2, ?3)",
            rusqlite::params![entity.entity_type(), entity.id(), attributes],
        )
        .map_err(query_failed)?;
        Ok(())
    }

    async fn insert_many(&self, entities: Vec<StoredEntity>) -> StoreResult<()> {
        let mut conn = self.get_connection()?;
        let tx = conn.transaction().map_err(query_failed)?;
        {
            let mut stmt = tx
                .prepare(
                    "INSERT OR REPLACE INTO entities (entity_type, id, attributes) VALUES (?1, ?2, ?3)",
                )
                .map_err(query_failed)?;
            for entity in &entities {
                let attributes = serde_json::to_string(entity.attributes())?;
                stmt.execute(rusqlite::params![entity.entity_type(), entity.id(), attributes])
                    .map_err(query_failed)?;
            }
        }
        tx.commit().map_err(query_failed)?;
        tracing::debug!(count = entities.len(), "Inserted entities");
        Ok(())
    }
}
