//! Query types understood by every backend.
//!
//! An [`EntityQuery`] names an entity type, a conjunction of predicates and
//! an ordered list of sort keys. Slicing is passed separately so the same
//! query can be counted and then fetched page by page.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A typed value compared against an attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Text value.
    Text(String),
    /// Integer value.
    Integer(i64),
    /// Boolean value.
    Boolean(bool),
}

impl FieldValue {
    /// Returns true when the JSON attribute value equals this value.
    ///
    /// Comparison is strict on type: the text `"1"` does not match the
    /// integer `1`.
    pub fn matches(&self, value: &Value) -> bool {
        match (self, value) {
            (FieldValue::Text(expected), Value::String(actual)) => expected == actual,
            (FieldValue::Integer(expected), Value::Number(actual)) => {
                actual.as_i64() == Some(*expected)
            }
            (FieldValue::Boolean(expected), Value::Bool(actual)) => expected == actual,
            _ => false,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => write!(f, "{}", s),
            FieldValue::Integer(n) => write!(f, "{}", n),
            FieldValue::Boolean(b) => write!(f, "{}", b),
        }
    }
}

/// A predicate on one attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Predicate {
    /// The attribute equals the value.
    Equals {
        /// Attribute name.
        field: String,
        /// Expected value.
        value: FieldValue,
    },
    /// The attribute equals one of the values.
    AnyOf {
        /// Attribute name.
        field: String,
        /// Accepted values.
        values: Vec<FieldValue>,
    },
}

impl Predicate {
    /// Creates an equality predicate.
    pub fn equals(field: impl Into<String>, value: FieldValue) -> Self {
        Predicate::Equals {
            field: field.into(),
            value,
        }
    }

    /// Creates a one-of predicate.
    pub fn any_of(field: impl Into<String>, values: Vec<FieldValue>) -> Self {
        Predicate::AnyOf {
            field: field.into(),
            values,
        }
    }

    /// Returns the attribute this predicate tests.
    pub fn field(&self) -> &str {
        match self {
            Predicate::Equals { field, .. } | Predicate::AnyOf { field, .. } => field,
        }
    }

    /// Evaluates the predicate against an attribute value (`None` when the
    /// attribute is absent).
    pub fn evaluate(&self, value: Option<&Value>) -> bool {
        let Some(value) = value else {
            return false;
        };
        match self {
            Predicate::Equals { value: expected, .. } => expected.matches(value),
            Predicate::AnyOf { values, .. } => values.iter().any(|v| v.matches(value)),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortDirection {
    /// Ascending order.
    #[default]
    Ascending,
    /// Descending order.
    Descending,
}

impl SortDirection {
    /// Returns the SQL keyword for this direction.
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        }
    }
}

/// One sort criterion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    /// Attribute name.
    pub field: String,
    /// Direction.
    pub direction: SortDirection,
}

impl SortKey {
    /// Creates an ascending key.
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Ascending,
        }
    }

    /// Creates a descending key.
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Descending,
        }
    }
}

/// A contiguous range of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slice {
    /// Number of results to skip.
    pub offset: u64,
    /// Maximum number of results to return.
    pub limit: u64,
}

impl Slice {
    /// Creates a slice.
    pub fn new(offset: u64, limit: u64) -> Self {
        Self { offset, limit }
    }
}

/// A filtered, sorted query over one entity type.
///
/// Predicates are combined with logical AND.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityQuery {
    /// The entity type being queried.
    pub entity_type: String,
    /// Predicates, all of which must hold.
    pub predicates: Vec<Predicate>,
    /// Sort keys, primary first.
    pub sort: Vec<SortKey>,
}

impl EntityQuery {
    /// Creates an unfiltered, unsorted query.
    pub fn new(entity_type: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            predicates: Vec::new(),
            sort: Vec::new(),
        }
    }

    /// Adds a predicate.
    pub fn with_predicate(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// Adds a sort key.
    pub fn with_sort(mut self, key: SortKey) -> Self {
        self.sort.push(key);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_value_strict_types() {
        assert!(FieldValue::Text("1".into()).matches(&json!("1")));
        assert!(!FieldValue::Text("1".into()).matches(&json!(1)));
        assert!(FieldValue::Integer(1).matches(&json!(1)));
        assert!(FieldValue::Boolean(true).matches(&json!(true)));
        assert!(!FieldValue::Boolean(true).matches(&json!(1)));
    }

    #[test]
    fn test_predicate_evaluate() {
        let eq = Predicate::equals("status", FieldValue::Text("active".into()));
        assert!(eq.evaluate(Some(&json!("active"))));
        assert!(!eq.evaluate(None));

        let any = Predicate::any_of(
            "status",
            vec![
                FieldValue::Text("active".into()),
                FieldValue::Text("pending".into()),
            ],
        );
        assert!(any.evaluate(Some(&json!("pending"))));
        assert!(!any.evaluate(Some(&json!("closed"))));
    }

    #[test]
    fn test_query_builder() {
        let query = EntityQuery::new("place")
            .with_predicate(Predicate::equals("dpt", FieldValue::Text("01".into())))
            .with_sort(SortKey::desc("label"));
        assert_eq!(query.predicates.len(), 1);
        assert_eq!(query.sort[0].direction, SortDirection::Descending);
    }
}
