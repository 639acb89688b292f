//! Error types for the store layer.
//!
//! Errors are split between problems with the query handed to a backend
//! ([`QueryError`]) and failures of the backend itself ([`BackendError`]).
//! Callers in the HTTP layer map every variant to a structured 400 response,
//! so messages here are written to be shown to API clients.

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use thiserror::Error;

/// The primary error type for all store operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The query could not be executed as written.
    #[error(transparent)]
    Query(#[from] QueryError),

    /// The backend failed while executing a well-formed query.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// A persisted entity could not be decoded.
    #[error("serialization error: {message}")]
    Serialization { message: String },
}

/// Errors caused by the shape of a query.
#[derive(Error, Debug)]
pub enum QueryError {
    /// A field name cannot be turned into an attribute path.
    #[error("invalid field name '{field}' for {entity_type}")]
    InvalidField { entity_type: String, field: String },

    /// A predicate carried no candidate values.
    #[error("predicate on '{field}' has no values")]
    EmptyPredicate { field: String },
}

/// Errors raised by a backend.
#[derive(Error, Debug)]
pub enum BackendError {
    /// No connection could be obtained.
    #[error("{backend_name}: connection failed: {message}")]
    ConnectionFailed {
        backend_name: String,
        message: String,
    },

    /// A statement failed.
    #[error("{backend_name}: {message}")]
    Internal {
        backend_name: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl BackendError {
    /// Builds an [`BackendError::Internal`] from any error source.
    pub fn internal<E>(backend_name: &str, message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        BackendError::Internal {
            backend_name: backend_name.to_string(),
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization {
            message: err.to_string(),
        }
    }
}

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
