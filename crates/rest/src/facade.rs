//! Per-request views of stored entities as JSON:API resources.

use std::collections::BTreeMap;

use dicotopo_store::types::StoredEntity;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use serde_json::{Map, Value};

use crate::pagination::LinkSet;
use crate::responses::{RelationshipObject, ResourceIdentifier, ResourceObject};
use crate::schema::{RelationshipDef, ResourceType};

/// Characters escaped when an id becomes a single path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Wraps one stored entity with its declared type and the API base URL,
/// and derives the resource object served for it.
#[derive(Debug, Clone, Copy)]
pub struct ResourceFacade<'a> {
    resource_type: &'a ResourceType,
    entity: &'a StoredEntity,
    api_base: &'a str,
}

impl<'a> ResourceFacade<'a> {
    /// Creates a facade. `api_base` is the absolute URL resource type
    /// collections hang off, e.g. `http://host/dico-topo/api/1.0`.
    pub fn new(resource_type: &'a ResourceType, entity: &'a StoredEntity, api_base: &'a str) -> Self {
        Self {
            resource_type,
            entity,
            api_base,
        }
    }

    /// The JSON:API type.
    pub fn type_name(&self) -> &'a str {
        self.resource_type.name()
    }

    /// The resource id.
    pub fn id(&self) -> &'a str {
        self.entity.id()
    }

    /// The wrapped entity.
    pub fn entity(&self) -> &'a StoredEntity {
        self.entity
    }

    /// Absolute URL of the resource.
    pub fn self_url(&self) -> String {
        format!(
            "{}/{}/{}",
            self.api_base,
            self.resource_type.plural(),
            utf8_percent_encode(self.entity.id(), PATH_SEGMENT)
        )
    }

    /// The `{type, id}` identifier.
    pub fn identifier(&self) -> ResourceIdentifier {
        ResourceIdentifier::new(self.type_name(), self.id())
    }

    /// Declared attributes present on the entity, `id` excluded.
    pub fn attributes(&self) -> Map<String, Value> {
        self.resource_type
            .attribute_fields()
            .filter_map(|field| {
                self.entity
                    .attribute(&field.name)
                    .map(|value| (field.name.clone(), value.clone()))
            })
            .collect()
    }

    /// The view of one declared relationship.
    pub fn relationship(&self, name: &str) -> Option<RelationshipView<'a>> {
        self.resource_type
            .relationship(name)
            .map(|def| RelationshipView::new(def, self.self_url()))
    }

    /// Views of every declared relationship.
    pub fn relationships(&self) -> Vec<RelationshipView<'a>> {
        let owner_url = self.self_url();
        self.resource_type
            .relationships()
            .iter()
            .map(|def| RelationshipView::new(def, owner_url.clone()))
            .collect()
    }

    /// The full resource object.
    pub fn resource(&self) -> ResourceObject {
        let relationships: BTreeMap<_, _> = self
            .relationships()
            .into_iter()
            .map(|view| {
                (
                    view.name().to_string(),
                    RelationshipObject {
                        links: view.links(),
                    },
                )
            })
            .collect();

        ResourceObject {
            type_name: self.type_name().to_string(),
            id: self.id().to_string(),
            attributes: self.attributes(),
            relationships,
            links: LinkSet::unpaginated(self.self_url()),
        }
    }
}

/// A relationship of one resource: its declaration and its link pair.
#[derive(Debug, Clone)]
pub struct RelationshipView<'a> {
    def: &'a RelationshipDef,
    owner_url: String,
}

impl<'a> RelationshipView<'a> {
    fn new(def: &'a RelationshipDef, owner_url: String) -> Self {
        Self { def, owner_url }
    }

    /// The declaration.
    pub fn def(&self) -> &'a RelationshipDef {
        self.def
    }

    /// Relationship name.
    pub fn name(&self) -> &'a str {
        &self.def.name
    }

    /// URL of the linkage route.
    pub fn self_url(&self) -> String {
        format!("{}/relationships/{}", self.owner_url, self.def.name)
    }

    /// URL of the related-resources route.
    pub fn related_url(&self) -> String {
        format!("{}/{}", self.owner_url, self.def.name)
    }

    /// The `{self, related}` link pair.
    pub fn links(&self) -> LinkSet {
        LinkSet::relationship(self.self_url(), self.related_url())
    }
}
