//! Stored entity type.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An entity as held by a store: a type, an identifier and a flat JSON
/// object of attributes.
///
/// Attribute values are plain JSON scalars or arrays; relationship
/// information lives in ordinary attributes (foreign keys or id lists) and is
/// interpreted by the HTTP layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredEntity {
    entity_type: String,
    id: String,
    attributes: Map<String, Value>,
}

impl StoredEntity {
    /// Creates a new entity.
    pub fn new(
        entity_type: impl Into<String>,
        id: impl Into<String>,
        attributes: Map<String, Value>,
    ) -> Self {
        Self {
            entity_type: entity_type.into(),
            id: id.into(),
            attributes,
        }
    }

    /// Creates an entity from a JSON value, which must be an object.
    ///
    /// Returns `None` for anything else.
    pub fn from_json(entity_type: impl Into<String>, id: impl Into<String>, value: Value) -> Option<Self> {
        match value {
            Value::Object(attributes) => Some(Self::new(entity_type, id, attributes)),
            _ => None,
        }
    }

    /// Returns the entity type.
    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    /// Returns the entity identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns all attributes.
    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    /// Returns one attribute, if present.
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Returns the value used to compare on `field`.
    ///
    /// `id` resolves to the identifier even when it is not repeated in the
    /// attribute map.
    pub fn field_value(&self, field: &str) -> Option<Value> {
        match self.attributes.get(field) {
            Some(value) => Some(value.clone()),
            None if field == "id" => Some(Value::String(self.id.clone())),
            None => None,
        }
    }
}
