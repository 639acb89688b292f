//! Relationship resolution.
//!
//! A relationship's data has one of two shapes. A query-backed relationship
//! is a store query (target resources whose foreign key equals the owner's
//! id) counted and sliced by the store. A list-backed relationship is a
//! list of identifiers read from an owner attribute, counted and sliced in
//! memory. Both are paged through the same [`Page`], so links and slices
//! agree whatever the shape.

use dicotopo_store::core::EntityStore;
use dicotopo_store::error::StoreResult;
use dicotopo_store::types::{EntityQuery, FieldValue, Predicate, SortKey, StoredEntity};
use serde_json::Value;
use tracing::warn;

use crate::pagination::Page;
use crate::responses::ResourceIdentifier;
use crate::schema::{ID_FIELD, RelationshipDef, RelationshipSource, ResourceType};

/// The data behind one relationship of one resource.
#[derive(Debug, Clone, PartialEq)]
pub enum RelationshipData {
    /// Resolved by a store query.
    QueryBacked(EntityQuery),
    /// Already materialized identifiers.
    ListBacked(Vec<ResourceIdentifier>),
}

impl RelationshipData {
    /// Builds the data of `def` for `owner`, whose related resources are of
    /// type `target`.
    pub fn for_owner(def: &RelationshipDef, owner: &StoredEntity, target: &ResourceType) -> Self {
        match &def.source {
            RelationshipSource::QueryBacked { foreign_key } => {
                let value = target
                    .field(foreign_key)
                    .and_then(|field| field.kind.parse_value(owner.id()))
                    .unwrap_or_else(|| FieldValue::Text(owner.id().to_string()));
                RelationshipData::QueryBacked(
                    EntityQuery::new(target.name())
                        .with_predicate(Predicate::equals(foreign_key, value))
                        .with_sort(SortKey::asc(ID_FIELD)),
                )
            }
            RelationshipSource::ListBacked { attribute } => RelationshipData::ListBacked(
                ids_from_attribute(owner.attribute(attribute))
                    .into_iter()
                    .map(|id| ResourceIdentifier::new(target.name(), id))
                    .collect(),
            ),
        }
    }
}

fn scalar_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Reads related ids from an attribute holding one id or an array of ids.
fn ids_from_attribute(value: Option<&Value>) -> Vec<String> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.iter().filter_map(scalar_id).collect(),
        Some(other) => scalar_id(other).into_iter().collect(),
    }
}

/// Resolves identifiers and resources of one relationship, optionally
/// restricted to a page.
#[derive(Debug)]
pub struct RelationshipResolver<'a, S> {
    store: &'a S,
    target: &'a ResourceType,
    data: RelationshipData,
}

impl<'a, S> RelationshipResolver<'a, S>
where
    S: EntityStore,
{
    /// Creates a resolver for `def` of `owner`.
    pub fn new(
        store: &'a S,
        def: &RelationshipDef,
        owner: &StoredEntity,
        target: &'a ResourceType,
    ) -> Self {
        Self {
            store,
            target,
            data: RelationshipData::for_owner(def, owner, target),
        }
    }

    /// The underlying data.
    pub fn data(&self) -> &RelationshipData {
        &self.data
    }

    /// The related resource type.
    pub fn target(&self) -> &'a ResourceType {
        self.target
    }

    /// Number of related resources.
    pub async fn count(&self) -> StoreResult<u64> {
        match &self.data {
            RelationshipData::QueryBacked(query) => self.store.count(query).await,
            RelationshipData::ListBacked(ids) => Ok(ids.len() as u64),
        }
    }

    /// Identifiers of the related resources on `page`, or all of them.
    pub async fn identifiers(&self, page: Option<&Page>) -> StoreResult<Vec<ResourceIdentifier>> {
        match &self.data {
            RelationshipData::QueryBacked(_) => Ok(self
                .fetch_query(page)
                .await?
                .iter()
                .map(|e| ResourceIdentifier::new(self.target.name(), e.id()))
                .collect()),
            RelationshipData::ListBacked(ids) => Ok(window(ids, page).to_vec()),
        }
    }

    /// The related resources on `page`, or all of them.
    ///
    /// Listed ids with no stored resource are skipped.
    pub async fn resources(&self, page: Option<&Page>) -> StoreResult<Vec<StoredEntity>> {
        match &self.data {
            RelationshipData::QueryBacked(_) => self.fetch_query(page).await,
            RelationshipData::ListBacked(ids) => {
                let wanted: Vec<String> = window(ids, page).iter().map(|i| i.id.clone()).collect();
                if wanted.is_empty() {
                    return Ok(Vec::new());
                }
                let found = self.store.read_many(self.target.name(), &wanted).await?;
                if found.len() < wanted.len() {
                    warn!(
                        resource_type = %self.target.name(),
                        missing = wanted.len() - found.len(),
                        "Relationship lists ids with no stored resource"
                    );
                }
                Ok(found)
            }
        }
    }

    async fn fetch_query(&self, page: Option<&Page>) -> StoreResult<Vec<StoredEntity>> {
        let RelationshipData::QueryBacked(query) = &self.data else {
            return Ok(Vec::new());
        };
        match page {
            Some(page) if page.is_empty() => Ok(Vec::new()),
            Some(page) => self.store.fetch(query, Some(page.slice())).await,
            None => self.store.fetch(query, None).await,
        }
    }
}

fn window<'a>(ids: &'a [ResourceIdentifier], page: Option<&Page>) -> &'a [ResourceIdentifier] {
    match page {
        Some(page) => ids.get(page.range()).unwrap_or(&[]),
        None => ids,
    }
}
