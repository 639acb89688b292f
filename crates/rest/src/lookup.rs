//! Resolution of a resource from its URL identifier.
//!
//! Single-resource and relationship routes first hand the `{id}` path
//! segment to an [`ObjectGetter`]. A getter either returns the entity or a
//! [`LookupFailure`] carrying the HTTP status and error entries to send
//! back unchanged, which lets a type customise its lookup (alternative
//! identifiers, soft-deleted entities) without touching the handlers.

use std::fmt;

use async_trait::async_trait;
use axum::http::StatusCode;
use dicotopo_store::core::EntityStore;
use dicotopo_store::types::StoredEntity;

use crate::responses::ErrorObject;
use crate::schema::ResourceType;

/// Why an identifier could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupFailure {
    /// Status of the error response.
    pub status: StatusCode,
    /// Error entries of the error response.
    pub errors: Vec<ErrorObject>,
}

impl LookupFailure {
    /// A failure with one error entry.
    pub fn new(status: StatusCode, details: impl Into<String>) -> Self {
        Self {
            status,
            errors: vec![ErrorObject::new(status, details)],
        }
    }

    /// The resource does not exist.
    pub fn not_found(resource_type: &str, id: &str) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            format!("{} {} not found", resource_type, id),
        )
    }
}

impl fmt::Display for LookupFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let details: Vec<_> = self.errors.iter().map(|e| e.details.as_str()).collect();
        write!(f, "{} ({})", details.join("; "), self.status)
    }
}

/// Resolves a URL identifier to a stored entity.
#[async_trait]
pub trait ObjectGetter<S>: Send + Sync
where
    S: EntityStore,
{
    /// Returns the entity of `resource_type` identified by `id`.
    async fn get(
        &self,
        store: &S,
        resource_type: &ResourceType,
        id: &str,
    ) -> Result<StoredEntity, LookupFailure>;
}

/// Reads the entity with the given id from the store.
///
/// Missing entities are a 404; store failures are a 400.
#[derive(Debug, Clone, Copy, Default)]
pub struct StoreObjectGetter;

#[async_trait]
impl<S> ObjectGetter<S> for StoreObjectGetter
where
    S: EntityStore,
{
    async fn get(
        &self,
        store: &S,
        resource_type: &ResourceType,
        id: &str,
    ) -> Result<StoredEntity, LookupFailure> {
        match store.read(resource_type.name(), id).await {
            Ok(Some(entity)) => Ok(entity),
            Ok(None) => Err(LookupFailure::not_found(resource_type.name(), id)),
            Err(e) => {
                tracing::warn!(
                    resource_type = %resource_type.name(),
                    id = %id,
                    error = %e,
                    "Lookup failed"
                );
                Err(LookupFailure::new(StatusCode::BAD_REQUEST, e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dicotopo_store::backends::memory::MemoryBackend;
    use serde_json::json;

    #[tokio::test]
    async fn test_store_getter() {
        let store = MemoryBackend::with_entities(vec![
            StoredEntity::from_json("place", "P1", json!({"label": "Ain"})).unwrap(),
        ]);
        let place = ResourceType::new("place", "places");

        let found = StoreObjectGetter.get(&store, &place, "P1").await.unwrap();
        assert_eq!(found.id(), "P1");

        let missing = StoreObjectGetter.get(&store, &place, "P2").await.unwrap_err();
        assert_eq!(missing.status, StatusCode::NOT_FOUND);
        assert_eq!(missing.errors.len(), 1);
        assert_eq!(missing.errors[0].status, 404);
        assert!(missing.to_string().contains("place P2 not found"));
    }

    struct ByLabel;

    #[async_trait]
    impl ObjectGetter<MemoryBackend> for ByLabel {
        async fn get(
            &self,
            store: &MemoryBackend,
            resource_type: &ResourceType,
            id: &str,
        ) -> Result<StoredEntity, LookupFailure> {
            use dicotopo_store::types::{EntityQuery, FieldValue, Predicate};
            let query = EntityQuery::new(resource_type.name())
                .with_predicate(Predicate::equals("label", FieldValue::Text(id.to_string())));
            let found = store
                .fetch(&query, None)
                .await
                .map_err(|e| LookupFailure::new(StatusCode::BAD_REQUEST, e.to_string()))?;
            found
                .into_iter()
                .next()
                .ok_or_else(|| LookupFailure::new(StatusCode::GONE, "no such label"))
        }
    }

    #[tokio::test]
    async fn test_custom_getter() {
        let store = MemoryBackend::with_entities(vec![
            StoredEntity::from_json("place", "P1", json!({"label": "Ain"})).unwrap(),
        ]);
        let place = ResourceType::new("place", "places");
        assert_eq!(ByLabel.get(&store, &place, "Ain").await.unwrap().id(), "P1");
        assert_eq!(
            ByLabel.get(&store, &place, "Nowhere").await.unwrap_err().status,
            StatusCode::GONE
        );
    }
}
