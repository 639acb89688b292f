//! `filter[<field>]` parameters.

use dicotopo_store::types::{FieldValue, Predicate};

use crate::config::FilterValueMode;
use crate::schema::ResourceType;

use super::{ParseError, QueryParams};

const FILTER_PREFIX: &str = "filter[";
const FILTER_SUFFIX: &str = "]";

/// Accepted values for one filtered field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterEntry {
    /// Filtered field.
    pub field: String,
    /// Distinct values, in request order.
    pub values: Vec<FieldValue>,
}

/// The filters of a request, one entry per field in order of first
/// appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    entries: Vec<FilterEntry>,
}

impl FilterSpec {
    /// Parses every `filter[<field>]` parameter.
    ///
    /// Each value is split on `,`; repeated keys contribute their values to
    /// the same field. Fields must be declared and filterable on
    /// `resource_type`, and every token must parse for the field's kind.
    pub fn parse(params: &QueryParams, resource_type: &ResourceType) -> Result<Self, ParseError> {
        let mut spec = FilterSpec::default();

        for (key, raw) in params.iter() {
            let Some(field) = key
                .strip_prefix(FILTER_PREFIX)
                .and_then(|rest| rest.strip_suffix(FILTER_SUFFIX))
            else {
                continue;
            };

            let def = resource_type
                .field(field)
                .ok_or_else(|| ParseError::UnknownField {
                    resource_type: resource_type.name().to_string(),
                    field: field.to_string(),
                })?;
            if !def.filterable {
                return Err(ParseError::NotFilterable {
                    resource_type: resource_type.name().to_string(),
                    field: field.to_string(),
                });
            }

            for token in raw.split(',') {
                let value = def
                    .kind
                    .parse_value(token)
                    .ok_or_else(|| ParseError::InvalidValue {
                        field: field.to_string(),
                        kind: def.kind.as_str(),
                        value: token.to_string(),
                    })?;
                spec.push(field, value);
            }
        }

        Ok(spec)
    }

    fn push(&mut self, field: &str, value: FieldValue) {
        match self.entries.iter_mut().find(|e| e.field == field) {
            Some(entry) => {
                if !entry.values.contains(&value) {
                    entry.values.push(value);
                }
            }
            None => self.entries.push(FilterEntry {
                field: field.to_string(),
                values: vec![value],
            }),
        }
    }

    /// Returns the parsed entries.
    pub fn entries(&self) -> &[FilterEntry] {
        &self.entries
    }

    /// Returns true if no filter was given.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Converts the filters into store predicates, all of which must hold.
    ///
    /// With [`FilterValueMode::All`] every value becomes its own equality,
    /// so two different values for one field match nothing. With
    /// [`FilterValueMode::Any`] the values of one field are alternatives.
    pub fn to_predicates(&self, mode: FilterValueMode) -> Vec<Predicate> {
        let mut predicates = Vec::new();
        for entry in &self.entries {
            match (mode, entry.values.as_slice()) {
                (FilterValueMode::Any, [single]) => {
                    predicates.push(Predicate::equals(&entry.field, single.clone()));
                }
                (FilterValueMode::Any, values) => {
                    predicates.push(Predicate::any_of(&entry.field, values.to_vec()));
                }
                (FilterValueMode::All, values) => predicates.extend(
                    values
                        .iter()
                        .map(|v| Predicate::equals(&entry.field, v.clone())),
                ),
            }
        }
        predicates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldDef;

    fn place() -> ResourceType {
        ResourceType::new("place", "places")
            .with_field(FieldDef::text("dpt"))
            .with_field(FieldDef::text("label"))
            .with_field(FieldDef::integer("num_start_page"))
            .with_field(FieldDef::text("desc").not_filterable())
    }

    fn text(s: &str) -> FieldValue {
        FieldValue::Text(s.to_string())
    }

    #[test]
    fn test_parse_splits_and_merges_values() {
        let params = QueryParams::parse("filter[dpt]=01,74&sort=label&filter[label]=Ain&filter[dpt]=01,71");
        let spec = FilterSpec::parse(&params, &place()).unwrap();
        assert_eq!(
            spec.entries(),
            &[
                FilterEntry {
                    field: "dpt".into(),
                    values: vec![text("01"), text("74"), text("71")],
                },
                FilterEntry {
                    field: "label".into(),
                    values: vec![text("Ain")],
                },
            ]
        );
    }

    #[test]
    fn test_no_filters() {
        let spec = FilterSpec::parse(&QueryParams::parse("sort=label"), &place()).unwrap();
        assert!(spec.is_empty());
        assert!(spec.to_predicates(FilterValueMode::All).is_empty());
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let params = QueryParams::parse("filter[nonexistent_field]=x");
        let err = FilterSpec::parse(&params, &place()).unwrap_err();
        assert!(matches!(err, ParseError::UnknownField { ref field, .. } if field == "nonexistent_field"));
        assert!(err.to_string().contains("nonexistent_field"));
    }

    #[test]
    fn test_not_filterable_is_rejected() {
        let params = QueryParams::parse("filter[desc]=x");
        assert!(matches!(
            FilterSpec::parse(&params, &place()),
            Err(ParseError::NotFilterable { .. })
        ));
    }

    #[test]
    fn test_typed_values() {
        let params = QueryParams::parse("filter[num_start_page]=12");
        let spec = FilterSpec::parse(&params, &place()).unwrap();
        assert_eq!(spec.entries()[0].values, vec![FieldValue::Integer(12)]);

        let params = QueryParams::parse("filter[num_start_page]=12,abc");
        assert!(matches!(
            FilterSpec::parse(&params, &place()),
            Err(ParseError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_predicates_all_mode() {
        let params = QueryParams::parse("filter[dpt]=01,74&filter[label]=Ain");
        let spec = FilterSpec::parse(&params, &place()).unwrap();
        assert_eq!(
            spec.to_predicates(FilterValueMode::All),
            vec![
                Predicate::equals("dpt", text("01")),
                Predicate::equals("dpt", text("74")),
                Predicate::equals("label", text("Ain")),
            ]
        );
    }

    #[test]
    fn test_predicates_any_mode() {
        let params = QueryParams::parse("filter[dpt]=01,74&filter[label]=Ain");
        let spec = FilterSpec::parse(&params, &place()).unwrap();
        assert_eq!(
            spec.to_predicates(FilterValueMode::Any),
            vec![
                Predicate::any_of("dpt", vec![text("01"), text("74")]),
                Predicate::equals("label", text("Ain")),
            ]
        );
    }

    #[test]
    fn test_filter_on_id() {
        let params = QueryParams::parse("filter[id]=P1");
        let spec = FilterSpec::parse(&params, &place()).unwrap();
        assert_eq!(spec.entries()[0].field, "id");
    }
}
