//! JSON:API top-level documents.

use std::collections::BTreeMap;

use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::pagination::LinkSet;

/// Media type of every document.
pub const JSONAPI_CONTENT_TYPE: &str = "application/vnd.api+json";

/// A `{type, id}` resource identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceIdentifier {
    /// Resource type name.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Resource id.
    pub id: String,
}

impl ResourceIdentifier {
    /// Creates an identifier.
    pub fn new(type_name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            id: id.into(),
        }
    }
}

/// The links of one relationship inside a resource object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelationshipObject {
    /// `self` and `related` links.
    pub links: LinkSet,
}

/// A full resource object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceObject {
    /// Resource type name.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Resource id.
    pub id: String,
    /// Declared attributes present on the entity.
    pub attributes: Map<String, Value>,
    /// Declared relationships.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub relationships: BTreeMap<String, RelationshipObject>,
    /// `self` link of the resource.
    pub links: LinkSet,
}

/// The primary data of a document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PrimaryData {
    /// An empty to-one relationship.
    Null,
    /// One resource.
    Resource(Box<ResourceObject>),
    /// A list of resources.
    Resources(Vec<ResourceObject>),
    /// One identifier (to-one linkage).
    Identifier(ResourceIdentifier),
    /// A list of identifiers (to-many linkage).
    Identifiers(Vec<ResourceIdentifier>),
}

/// A document carrying data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataDocument {
    /// Primary data.
    pub data: PrimaryData,
    /// Top-level links.
    #[serde(skip_serializing_if = "LinkSet::is_empty")]
    pub links: LinkSet,
}

impl DataDocument {
    /// Creates a document.
    pub fn new(data: PrimaryData, links: LinkSet) -> Self {
        Self { data, links }
    }
}

/// One entry of an error document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorObject {
    /// HTTP status code.
    pub status: u16,
    /// Human-readable explanation.
    pub details: String,
}

impl ErrorObject {
    /// Creates an error entry.
    pub fn new(status: StatusCode, details: impl Into<String>) -> Self {
        Self {
            status: status.as_u16(),
            details: details.into(),
        }
    }
}

/// A document carrying errors and no data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorDocument {
    /// The errors.
    pub errors: Vec<ErrorObject>,
}

/// Serializes a document with the JSON:API media type.
pub fn jsonapi_response<T: Serialize>(status: StatusCode, document: T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, JSONAPI_CONTENT_TYPE)],
        Json(document),
    )
        .into_response()
}

impl IntoResponse for DataDocument {
    fn into_response(self) -> Response {
        jsonapi_response(StatusCode::OK, self)
    }
}
