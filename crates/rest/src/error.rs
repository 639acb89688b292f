//! Error types for the JSON:API layer.
//!
//! Every failure leaves a handler as an error document
//! (`{"errors": [{"status", "details"}]}`); no partial data is ever
//! returned alongside an error.
//!
//! # Error Mapping
//!
//! | Source | HTTP Status |
//! |--------|-------------|
//! | Query parameter parse failure | 400 |
//! | Store failure (any) | 400 |
//! | Object getter failure | status supplied by the getter |
//! | Undeclared relationship | 404 |
//! | Internal error | 500 |

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use dicotopo_store::error::StoreError;
use std::fmt;

use crate::lookup::LookupFailure;
use crate::query::ParseError;
use crate::responses::{ErrorDocument, ErrorObject, jsonapi_response};

/// The primary error type for route handlers.
#[derive(Debug)]
pub enum RestError {
    /// Bad request (HTTP 400).
    BadRequest {
        /// Error message.
        message: String,
    },

    /// The object getter could not resolve the requested resource.
    Lookup(LookupFailure),

    /// The relationship is not declared on the type (HTTP 404).
    UnknownRelationship {
        /// The resource type.
        resource_type: String,
        /// The requested relationship.
        relationship: String,
    },

    /// Internal server error (HTTP 500).
    InternalError {
        /// Error message.
        message: String,
    },
}

impl RestError {
    /// Returns the HTTP status of this error.
    pub fn status(&self) -> StatusCode {
        match self {
            RestError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            RestError::Lookup(failure) => failure.status,
            RestError::UnknownRelationship { .. } => StatusCode::NOT_FOUND,
            RestError::InternalError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for RestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RestError::BadRequest { message } => write!(f, "Bad request: {}", message),
            RestError::Lookup(failure) => write!(f, "Lookup failed: {}", failure),
            RestError::UnknownRelationship {
                resource_type,
                relationship,
            } => write!(
                f,
                "Unknown relationship '{}' on {}",
                relationship, resource_type
            ),
            RestError::InternalError { message } => write!(f, "Internal error: {}", message),
        }
    }
}

impl std::error::Error for RestError {}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        let status = self.status();
        let errors = match self {
            RestError::BadRequest { message } => vec![ErrorObject::new(status, message)],
            RestError::Lookup(failure) => failure.errors,
            RestError::UnknownRelationship {
                resource_type,
                relationship,
            } => vec![ErrorObject::new(
                status,
                format!(
                    "Relationship '{}' is not declared on {}",
                    relationship, resource_type
                ),
            )],
            RestError::InternalError { message } => vec![ErrorObject::new(status, message)],
        };

        jsonapi_response(status, ErrorDocument { errors })
    }
}

impl From<ParseError> for RestError {
    fn from(err: ParseError) -> Self {
        RestError::BadRequest {
            message: err.to_string(),
        }
    }
}

impl From<StoreError> for RestError {
    fn from(err: StoreError) -> Self {
        tracing::warn!(error = %err, "Store query failed");
        RestError::BadRequest {
            message: err.to_string(),
        }
    }
}

impl From<LookupFailure> for RestError {
    fn from(failure: LookupFailure) -> Self {
        RestError::Lookup(failure)
    }
}

/// Result type for route handlers.
pub type RestResult<T> = Result<T, RestError>;
