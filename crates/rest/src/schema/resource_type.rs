//! Declared resource types, fields and relationships.

use dicotopo_store::types::FieldValue;

use crate::pagination::PageLimits;

/// Name of the identifier field every resource type has.
pub const ID_FIELD: &str = "id";

/// Value type of a declared field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text.
    Text,
    /// Signed integer.
    Integer,
    /// `true`/`false` (also `1`/`0`).
    Boolean,
}

impl FieldKind {
    /// Parses a raw query-string token into a typed value.
    ///
    /// Returns `None` when the token is not valid for this kind.
    pub fn parse_value(&self, raw: &str) -> Option<FieldValue> {
        match self {
            FieldKind::Text => Some(FieldValue::Text(raw.to_string())),
            FieldKind::Integer => raw.trim().parse().ok().map(FieldValue::Integer),
            FieldKind::Boolean => match raw.trim() {
                "true" | "1" => Some(FieldValue::Boolean(true)),
                "false" | "0" => Some(FieldValue::Boolean(false)),
                _ => None,
            },
        }
    }

    /// Returns the lowercase name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Integer => "integer",
            FieldKind::Boolean => "boolean",
        }
    }
}

/// A declared attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    /// Attribute name as stored and as exposed.
    pub name: String,
    /// Value type.
    pub kind: FieldKind,
    /// Whether `filter[name]` is accepted.
    pub filterable: bool,
    /// Whether `sort=name` is accepted.
    pub sortable: bool,
}

impl FieldDef {
    /// Creates a filterable, sortable field.
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            filterable: true,
            sortable: true,
        }
    }

    /// Creates a text field.
    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Text)
    }

    /// Creates an integer field.
    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Integer)
    }

    /// Creates a boolean field.
    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Boolean)
    }

    /// Disallows filtering on this field.
    pub fn not_filterable(mut self) -> Self {
        self.filterable = false;
        self
    }

    /// Disallows sorting on this field.
    pub fn not_sortable(mut self) -> Self {
        self.sortable = false;
        self
    }
}

/// Whether a relationship points to one resource or many.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// At most one related resource; `data` is an object or `null`.
    ToOne,
    /// Any number of related resources; `data` is an array.
    ToMany,
}

/// Where the related identifiers come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationshipSource {
    /// Related resources are the target-type resources whose `foreign_key`
    /// field equals the owner's id. Counted and sliced by the store.
    QueryBacked {
        /// Field of the target type holding the owner's id.
        foreign_key: String,
    },
    /// Related ids are read from an attribute of the owner, either a single
    /// id or an array of ids. Counted and sliced in memory.
    ListBacked {
        /// Attribute of the owner holding the related id(s).
        attribute: String,
    },
}

/// A declared relationship.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipDef {
    /// Relationship name, used as a URL segment.
    pub name: String,
    /// Name of the related resource type.
    pub target_type: String,
    /// One or many.
    pub cardinality: Cardinality,
    /// How related identifiers are obtained.
    pub source: RelationshipSource,
}

impl RelationshipDef {
    /// A to-many relationship resolved through a foreign key on the target.
    pub fn to_many_query(
        name: impl Into<String>,
        target_type: impl Into<String>,
        foreign_key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            target_type: target_type.into(),
            cardinality: Cardinality::ToMany,
            source: RelationshipSource::QueryBacked {
                foreign_key: foreign_key.into(),
            },
        }
    }

    /// A to-many relationship read from an id list attribute.
    pub fn to_many_list(
        name: impl Into<String>,
        target_type: impl Into<String>,
        attribute: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            target_type: target_type.into(),
            cardinality: Cardinality::ToMany,
            source: RelationshipSource::ListBacked {
                attribute: attribute.into(),
            },
        }
    }

    /// A to-one relationship read from an id attribute.
    pub fn to_one(
        name: impl Into<String>,
        target_type: impl Into<String>,
        attribute: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            target_type: target_type.into(),
            cardinality: Cardinality::ToOne,
            source: RelationshipSource::ListBacked {
                attribute: attribute.into(),
            },
        }
    }

    /// Returns true for to-many relationships.
    pub fn is_to_many(&self) -> bool {
        self.cardinality == Cardinality::ToMany
    }
}

/// A resource type exposed by the API.
///
/// Every type implicitly declares a filterable, sortable text `id` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceType {
    name: String,
    plural: String,
    fields: Vec<FieldDef>,
    relationships: Vec<RelationshipDef>,
    page_limits: Option<PageLimits>,
}

impl ResourceType {
    /// Creates a type with only the `id` field.
    pub fn new(name: impl Into<String>, plural: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            plural: plural.into(),
            fields: vec![FieldDef::text(ID_FIELD)],
            relationships: Vec::new(),
            page_limits: None,
        }
    }

    /// Adds a field.
    pub fn with_field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    /// Adds several fields.
    pub fn with_fields(mut self, fields: impl IntoIterator<Item = FieldDef>) -> Self {
        self.fields.extend(fields);
        self
    }

    /// Adds a relationship.
    pub fn with_relationship(mut self, relationship: RelationshipDef) -> Self {
        self.relationships.push(relationship);
        self
    }

    /// Overrides the server-wide page limits for this type.
    pub fn with_page_limits(mut self, limits: PageLimits) -> Self {
        self.page_limits = Some(limits);
        self
    }

    /// The JSON:API `type` member.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The collection path segment.
    pub fn plural(&self) -> &str {
        &self.plural
    }

    /// All declared fields, `id` first.
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// Declared attributes exposed under `attributes` (every field but `id`).
    pub fn attribute_fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.iter().filter(|f| f.name != ID_FIELD)
    }

    /// Looks up a declared field.
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// All declared relationships.
    pub fn relationships(&self) -> &[RelationshipDef] {
        &self.relationships
    }

    /// Looks up a declared relationship.
    pub fn relationship(&self, name: &str) -> Option<&RelationshipDef> {
        self.relationships.iter().find(|r| r.name == name)
    }

    /// Returns this type's page limits, or `default` when not overridden.
    pub fn page_limits_or(&self, default: PageLimits) -> PageLimits {
        self.page_limits.unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_kind_parsing() {
        assert_eq!(
            FieldKind::Text.parse_value(" 01"),
            Some(FieldValue::Text(" 01".into()))
        );
        assert_eq!(FieldKind::Integer.parse_value("42"), Some(FieldValue::Integer(42)));
        assert_eq!(FieldKind::Integer.parse_value("4x"), None);
        assert_eq!(FieldKind::Boolean.parse_value("1"), Some(FieldValue::Boolean(true)));
        assert_eq!(FieldKind::Boolean.parse_value("no"), None);
    }

    #[test]
    fn test_id_is_implicit_but_not_an_attribute() {
        let place = ResourceType::new("place", "places").with_field(FieldDef::text("label"));
        assert!(place.field("id").is_some());
        let attributes: Vec<_> = place.attribute_fields().map(|f| f.name.as_str()).collect();
        assert_eq!(attributes, vec!["label"]);
    }

    #[test]
    fn test_field_flags() {
        let field = FieldDef::text("desc").not_filterable().not_sortable();
        assert!(!field.filterable);
        assert!(!field.sortable);
    }

    #[test]
    fn test_relationship_lookup_and_limits() {
        let place = ResourceType::new("place", "places")
            .with_relationship(RelationshipDef::to_many_query(
                "old-labels",
                "place-old-label",
                "place_id",
            ))
            .with_page_limits(PageLimits::new(5, 20));
        let rel = place.relationship("old-labels").unwrap();
        assert!(rel.is_to_many());
        assert!(place.relationship("nope").is_none());
        assert_eq!(
            place.page_limits_or(PageLimits::new(200, 200)),
            PageLimits::new(5, 20)
        );
    }
}
