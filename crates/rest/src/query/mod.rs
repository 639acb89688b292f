//! Query string parsing.
//!
//! Turns the raw parameters of a request into the filter and sort
//! specifications applied to a resource type:
//!
//! - `filter[<field>]=v1,v2` (repeatable) - see [`FilterSpec`]
//! - `sort=f1,-f2` - see [`SortSpec`]
//!
//! Page parameters are parsed by [`crate::pagination::PageRequest`].
//! Every failure is a [`ParseError`] and is reported as a 400 before any
//! store access.

mod filter;
mod params;
mod sort;

pub use filter::{FilterEntry, FilterSpec};
pub use params::{QueryParams, make_url};
pub use sort::SortSpec;

use thiserror::Error;

use crate::config::{FilterValueMode, SortDirectionMode};

/// Options controlling how filter values and sort directions combine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryOptions {
    /// Combination of sort directions.
    pub sort_direction: SortDirectionMode,
    /// Combination of filter values.
    pub filter_values: FilterValueMode,
}

/// A query parameter that cannot be applied.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    /// The field is not declared on the resource type.
    #[error("'{field}' is not an attribute of {resource_type}")]
    UnknownField {
        /// Resource type name.
        resource_type: String,
        /// Requested field.
        field: String,
    },

    /// The field exists but cannot be filtered on.
    #[error("cannot filter {resource_type} on '{field}'")]
    NotFilterable {
        /// Resource type name.
        resource_type: String,
        /// Requested field.
        field: String,
    },

    /// The field exists but cannot be sorted on.
    #[error("cannot sort {resource_type} on '{field}'")]
    NotSortable {
        /// Resource type name.
        resource_type: String,
        /// Requested field.
        field: String,
    },

    /// A filter value does not fit the field's kind.
    #[error("invalid {kind} value '{value}' for filter on '{field}'")]
    InvalidValue {
        /// Filtered field.
        field: String,
        /// Expected kind.
        kind: &'static str,
        /// Offending token.
        value: String,
    },

    /// A sort criterion names no field.
    #[error("empty sort criterion in '{sort}'")]
    EmptySortField {
        /// The raw `sort` value.
        sort: String,
    },

    /// A page parameter is not a positive integer.
    #[error("{parameter} must be a positive integer, got '{value}'")]
    InvalidPageParameter {
        /// `page[number]` or `page[size]`.
        parameter: &'static str,
        /// Offending value.
        value: String,
    },
}
