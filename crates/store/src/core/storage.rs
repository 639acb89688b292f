//! Core entity store traits.
//!
//! [`EntityStore`] is the read capability the HTTP layer depends on: it
//! executes filter + sort + count + slice for one entity type and resolves
//! entities by identifier. [`EntityWriter`] is kept separate because no HTTP
//! route writes; it exists for loading data and for tests.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;

use crate::error::{QueryError, StoreResult};
use crate::types::{EntityQuery, Predicate, Slice, StoredEntity};

static FIELD_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_\-]*$").expect("valid field regex"));

/// Read access to persisted entities.
///
/// Implementations must return results ordered by the query's sort keys,
/// breaking ties on the entity id (ascending), so that slices taken with
/// consecutive offsets never overlap.
///
/// # Example
///
/// ```ignore
/// use dicotopo_store::core::EntityStore;
/// use dicotopo_store::types::{EntityQuery, Slice, SortKey};
///
/// async fn first_page<S: EntityStore>(store: &S) -> StoreResult<()> {
///     let query = EntityQuery::new("place").with_sort(SortKey::asc("label"));
///     let total = store.count(&query).await?;
///     let page = store.fetch(&query, Some(Slice::new(0, 20))).await?;
///     println!("{} of {}", page.len(), total);
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Returns a human-readable name for this backend.
    fn backend_name(&self) -> &'static str;

    /// Reads one entity by type and id.
    async fn read(&self, entity_type: &str, id: &str) -> StoreResult<Option<StoredEntity>>;

    /// Reads several entities of one type.
    ///
    /// The result follows the order of `ids`; ids with no entity are
    /// skipped.
    async fn read_many(&self, entity_type: &str, ids: &[String]) -> StoreResult<Vec<StoredEntity>>;

    /// Counts the entities matching a query.
    async fn count(&self, query: &EntityQuery) -> StoreResult<u64>;

    /// Fetches the entities matching a query, optionally restricted to a
    /// slice of the ordered result.
    async fn fetch(&self, query: &EntityQuery, slice: Option<Slice>)
    -> StoreResult<Vec<StoredEntity>>;
}

/// Write access used to load data.
#[async_trait]
pub trait EntityWriter: Send + Sync {
    /// Inserts an entity, replacing any entity with the same type and id.
    async fn insert(&self, entity: StoredEntity) -> StoreResult<()>;

    /// Inserts several entities.
    async fn insert_many(&self, entities: Vec<StoredEntity>) -> StoreResult<()> {
        for entity in entities {
            self.insert(entity).await?;
        }
        Ok(())
    }
}

/// Checks that every field referenced by a query is a usable attribute name
/// and that no predicate is empty.
pub fn validate_query(query: &EntityQuery) -> Result<(), QueryError> {
    let fields = query
        .predicates
        .iter()
        .map(Predicate::field)
        .chain(query.sort.iter().map(|key| key.field.as_str()));

    for field in fields {
        if !FIELD_NAME.is_match(field) {
            return Err(QueryError::InvalidField {
                entity_type: query.entity_type.clone(),
                field: field.to_string(),
            });
        }
    }

    for predicate in &query.predicates {
        if let Predicate::AnyOf { field, values } = predicate
            && values.is_empty()
        {
            return Err(QueryError::EmptyPredicate {
                field: field.clone(),
            });
        }
    }

    Ok(())
}
