//! The registry of exposed resource types.

use std::collections::BTreeMap;
use std::sync::Arc;

use thiserror::Error;

use super::resource_type::{RelationshipSource, ResourceType};

/// Inconsistent resource declarations, reported before routes are built.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// Two types share a name.
    #[error("resource type '{0}' is registered twice")]
    DuplicateType(String),

    /// Two types share a collection path segment.
    #[error("plural '{plural}' of '{resource_type}' is already used")]
    DuplicatePlural {
        /// The type being registered.
        resource_type: String,
        /// The clashing plural.
        plural: String,
    },

    /// A field or relationship name is declared twice on one type.
    #[error("'{name}' is declared twice on '{resource_type}'")]
    DuplicateMember {
        /// Owning type.
        resource_type: String,
        /// Clashing name.
        name: String,
    },

    /// A relationship name cannot be used as a URL segment.
    #[error("relationship name '{name}' on '{resource_type}' is reserved")]
    ReservedName {
        /// Owning type.
        resource_type: String,
        /// The relationship.
        name: String,
    },

    /// A relationship targets an unregistered type.
    #[error("relationship '{relationship}' of '{resource_type}' targets unknown type '{target}'")]
    UnknownTarget {
        /// Owning type.
        resource_type: String,
        /// The relationship.
        relationship: String,
        /// Missing target type.
        target: String,
    },

    /// A query-backed relationship names a foreign key the target lacks.
    #[error("relationship '{relationship}' of '{resource_type}' uses undeclared field '{target}.{field}'")]
    UnknownForeignKey {
        /// Owning type.
        resource_type: String,
        /// The relationship.
        relationship: String,
        /// Target type.
        target: String,
        /// Missing field.
        field: String,
    },

    /// A type or relationship is not registered.
    #[error("'{0}' is not registered")]
    NotRegistered(String),
}

/// Resource types by name.
#[derive(Debug, Clone, Default)]
pub struct ResourceRegistry {
    types: BTreeMap<String, Arc<ResourceType>>,
}

impl ResourceRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a type.
    ///
    /// Checks the type's own declarations; cross-type references are
    /// checked by [`ResourceRegistry::validate`].
    pub fn register(&mut self, resource_type: ResourceType) -> Result<(), RegistryError> {
        let name = resource_type.name().to_string();
        if self.types.contains_key(&name) {
            return Err(RegistryError::DuplicateType(name));
        }
        if self.types.values().any(|t| t.plural() == resource_type.plural()) {
            return Err(RegistryError::DuplicatePlural {
                resource_type: name,
                plural: resource_type.plural().to_string(),
            });
        }

        let mut seen = Vec::new();
        let members = resource_type
            .fields()
            .iter()
            .map(|f| f.name.as_str())
            .chain(resource_type.relationships().iter().map(|r| r.name.as_str()));
        for member in members {
            if seen.contains(&member) {
                return Err(RegistryError::DuplicateMember {
                    resource_type: name,
                    name: member.to_string(),
                });
            }
            seen.push(member);
        }

        for relationship in resource_type.relationships() {
            if relationship.name == "relationships" || relationship.name.contains('/') {
                return Err(RegistryError::ReservedName {
                    resource_type: name,
                    name: relationship.name.clone(),
                });
            }
        }

        self.types.insert(name, Arc::new(resource_type));
        Ok(())
    }

    /// Registers a type, builder style.
    pub fn with(mut self, resource_type: ResourceType) -> Result<Self, RegistryError> {
        self.register(resource_type)?;
        Ok(self)
    }

    /// Checks that every relationship targets a registered type, and that
    /// query-backed relationships name a declared field of their target.
    pub fn validate(&self) -> Result<(), RegistryError> {
        for resource_type in self.types.values() {
            for relationship in resource_type.relationships() {
                let target = self.get(&relationship.target_type).ok_or_else(|| {
                    RegistryError::UnknownTarget {
                        resource_type: resource_type.name().to_string(),
                        relationship: relationship.name.clone(),
                        target: relationship.target_type.clone(),
                    }
                })?;

                if let RelationshipSource::QueryBacked { foreign_key } = &relationship.source
                    && target.field(foreign_key).is_none()
                {
                    return Err(RegistryError::UnknownForeignKey {
                        resource_type: resource_type.name().to_string(),
                        relationship: relationship.name.clone(),
                        target: target.name().to_string(),
                        field: foreign_key.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Looks up a type by name.
    pub fn get(&self, name: &str) -> Option<&Arc<ResourceType>> {
        self.types.get(name)
    }

    /// Looks up a type by its collection path segment.
    pub fn by_plural(&self, plural: &str) -> Option<&Arc<ResourceType>> {
        self.types.values().find(|t| t.plural() == plural)
    }

    /// Iterates over registered types, by name.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<ResourceType>> {
        self.types.values()
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns true if no type is registered.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
