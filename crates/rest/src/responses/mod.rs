//! Response documents.
//!
//! - [`document`] - data and error documents, resource objects and
//!   identifiers, served as `application/vnd.api+json`

pub mod document;

pub use document::{
    DataDocument, ErrorDocument, ErrorObject, JSONAPI_CONTENT_TYPE, PrimaryData,
    RelationshipObject, ResourceIdentifier, ResourceObject, jsonapi_response,
};
