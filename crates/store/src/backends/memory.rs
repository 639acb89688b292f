//! In-memory backend.
//!
//! Keeps entities in ordered maps behind a read-write lock. Ordering rules
//! follow SQLite so both backends page identically: missing and null values
//! sort first in ascending order, then booleans, numbers and text.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;

use crate::core::{EntityStore, EntityWriter, validate_query};
use crate::error::StoreResult;
use crate::types::{EntityQuery, Slice, SortDirection, SortKey, StoredEntity};

/// In-memory entity store.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entities: RwLock<HashMap<String, BTreeMap<String, StoredEntity>>>,
}

impl MemoryBackend {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding the given entities.
    pub fn with_entities(entities: impl IntoIterator<Item = StoredEntity>) -> Self {
        let backend = Self::new();
        {
            let mut map = backend.entities.write();
            for entity in entities {
                map.entry(entity.entity_type().to_string())
                    .or_default()
                    .insert(entity.id().to_string(), entity);
            }
        }
        backend
    }

    /// Returns the number of stored entities of all types.
    pub fn len(&self) -> usize {
        self.entities.read().values().map(BTreeMap::len).sum()
    }

    /// Returns true if the store holds no entity.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn matching(&self, query: &EntityQuery) -> StoreResult<Vec<StoredEntity>> {
        validate_query(query)?;
        let map = self.entities.read();
        let Some(of_type) = map.get(&query.entity_type) else {
            return Ok(Vec::new());
        };

        let mut matched: Vec<StoredEntity> = of_type
            .values()
            .filter(|entity| {
                query
                    .predicates
                    .iter()
                    .all(|p| p.evaluate(entity.field_value(p.field()).as_ref()))
            })
            .cloned()
            .collect();

        matched.sort_by(|a, b| compare_entities(a, b, &query.sort));
        Ok(matched)
    }
}

fn compare_entities(a: &StoredEntity, b: &StoredEntity, keys: &[SortKey]) -> Ordering {
    for key in keys {
        let ordering = compare_values(
            a.field_value(&key.field).as_ref(),
            b.field_value(&key.field).as_ref(),
        );
        let ordering = match key.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    a.id().cmp(b.id())
}

fn rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Bool(_)) => 1,
        Some(Value::Number(_)) => 2,
        Some(Value::String(_)) => 3,
        Some(Value::Array(_)) | Some(Value::Object(_)) => 4,
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

#[async_trait]
impl EntityStore for MemoryBackend {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn read(&self, entity_type: &str, id: &str) -> StoreResult<Option<StoredEntity>> {
        Ok(self
            .entities
            .read()
            .get(entity_type)
            .and_then(|of_type| of_type.get(id))
            .cloned())
    }

    async fn read_many(&self, entity_type: &str, ids: &[String]) -> StoreResult<Vec<StoredEntity>> {
        let map = self.entities.read();
        let Some(of_type) = map.get(entity_type) else {
            return Ok(Vec::new());
        };
        Ok(ids.iter().filter_map(|id| of_type.get(id).cloned()).collect())
    }

    async fn count(&self, query: &EntityQuery) -> StoreResult<u64> {
        Ok(self.matching(query)?.len() as u64)
    }

    async fn fetch(
        &self,
        query: &EntityQuery,
        slice: Option<Slice>,
    ) -> StoreResult<Vec<StoredEntity>> {
        let matched = self.matching(query)?;
        Ok(match slice {
            None => matched,
            Some(slice) => matched
                .into_iter()
                .skip(usize::try_from(slice.offset).unwrap_or(usize::MAX))
                .take(usize::try_from(slice.limit).unwrap_or(usize::MAX))
                .collect(),
        })
    }
}

#[async_trait]
impl EntityWriter for MemoryBackend {
    async fn insert(&self, entity: StoredEntity) -> StoreResult<()> {
        self.entities
            .write()
            .entry(entity.entity_type().to_string())
            .or_default()
            .insert(entity.id().to_string(), entity);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{QueryError, StoreError};
    use crate::types::{FieldValue, Predicate};
    use serde_json::json;

    fn place(id: &str, attributes: Value) -> StoredEntity {
        StoredEntity::from_json("place", id, attributes).unwrap()
    }

    fn backend() -> MemoryBackend {
        MemoryBackend::with_entities(vec![
            place("P3", json!({"label": "Cluny", "dpt": "71", "rank": 2})),
            place("P1", json!({"label": "Annecy", "dpt": "74", "rank": 1})),
            place("P2", json!({"label": "Bourg", "dpt": "01"})),
            place("P4", json!({"label": "Belley", "dpt": "01", "rank": 2})),
        ])
    }

    #[tokio::test]
    async fn test_read_and_read_many_order() {
        let backend = backend();
        assert!(backend.read("place", "P1").await.unwrap().is_some());
        assert!(backend.read("place", "nope").await.unwrap().is_none());
        assert!(backend.read("commune", "P1").await.unwrap().is_none());

        let ids = vec!["P4".to_string(), "missing".to_string(), "P1".to_string()];
        let found = backend.read_many("place", &ids).await.unwrap();
        let found: Vec<_> = found.iter().map(StoredEntity::id).collect();
        assert_eq!(found, vec!["P4", "P1"]);
    }

    #[tokio::test]
    async fn test_filter_and_count() {
        let backend = backend();
        let query = EntityQuery::new("place")
            .with_predicate(Predicate::equals("dpt", FieldValue::Text("01".into())));
        assert_eq!(backend.count(&query).await.unwrap(), 2);

        // Two equalities on one field can only both hold for equal values.
        let both = query
            .clone()
            .with_predicate(Predicate::equals("dpt", FieldValue::Text("74".into())));
        assert_eq!(backend.count(&both).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_sort_nulls_first_then_id_tiebreak() {
        let backend = backend();
        let query = EntityQuery::new("place").with_sort(SortKey::asc("rank"));
        let ids: Vec<_> = backend
            .fetch(&query, None)
            .await
            .unwrap()
            .iter()
            .map(|e| e.id().to_string())
            .collect();
        assert_eq!(ids, vec!["P2", "P1", "P3", "P4"]);

        let query = EntityQuery::new("place").with_sort(SortKey::desc("rank"));
        let ids: Vec<_> = backend
            .fetch(&query, None)
            .await
            .unwrap()
            .iter()
            .map(|e| e.id().to_string())
            .collect();
        assert_eq!(ids, vec!["P3", "P4", "P1", "P2"]);
    }

    #[tokio::test]
    async fn test_fetch_slice() {
        let backend = backend();
        let query = EntityQuery::new("place").with_sort(SortKey::asc("label"));
        let page = backend.fetch(&query, Some(Slice::new(1, 2))).await.unwrap();
        let labels: Vec<_> = page.iter().map(|e| e.attribute("label").unwrap().clone()).collect();
        assert_eq!(labels, vec![json!("Belley"), json!("Bourg")]);

        let beyond = backend.fetch(&query, Some(Slice::new(10, 2))).await.unwrap();
        assert!(beyond.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_field_is_query_error() {
        let backend = backend();
        let query = EntityQuery::new("place").with_sort(SortKey::asc("bad field"));
        let err = backend.count(&query).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::Query(QueryError::InvalidField { .. })
        ));
    }

    #[tokio::test]
    async fn test_insert_replaces() {
        let backend = MemoryBackend::new();
        assert!(backend.is_empty());
        backend.insert(place("P1", json!({"label": "a"}))).await.unwrap();
        backend.insert(place("P1", json!({"label": "b"}))).await.unwrap();
        assert_eq!(backend.len(), 1);
        let stored = backend.read("place", "P1").await.unwrap().unwrap();
        assert_eq!(stored.attribute("label"), Some(&json!("b")));
    }
}
