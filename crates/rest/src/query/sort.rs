//! The `sort` parameter.

use dicotopo_store::types::{SortDirection, SortKey};

use crate::config::SortDirectionMode;
use crate::schema::ResourceType;

use super::{ParseError, QueryParams};

const SORT_PARAM: &str = "sort";

/// Ordered sort criteria, primary first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortSpec {
    keys: Vec<SortKey>,
}

impl SortSpec {
    /// Parses the `sort` parameter.
    ///
    /// Criteria are separated by `,`; a leading `-` sorts descending.
    /// Repeated `sort` keys are read in order, as if comma-joined. Every
    /// field must be declared and sortable on `resource_type`.
    pub fn parse(
        params: &QueryParams,
        resource_type: &ResourceType,
        mode: SortDirectionMode,
    ) -> Result<Self, ParseError> {
        let mut keys = Vec::new();

        for raw in params.get_all(SORT_PARAM) {
            for criterion in raw.split(',') {
                let (field, direction) = match criterion.strip_prefix('-') {
                    Some(field) => (field, SortDirection::Descending),
                    None => (criterion, SortDirection::Ascending),
                };
                if field.is_empty() {
                    return Err(ParseError::EmptySortField {
                        sort: raw.to_string(),
                    });
                }

                let def = resource_type
                    .field(field)
                    .ok_or_else(|| ParseError::UnknownField {
                        resource_type: resource_type.name().to_string(),
                        field: field.to_string(),
                    })?;
                if !def.sortable {
                    return Err(ParseError::NotSortable {
                        resource_type: resource_type.name().to_string(),
                        field: field.to_string(),
                    });
                }

                keys.push(SortKey {
                    field: field.to_string(),
                    direction,
                });
            }
        }

        if mode == SortDirectionMode::LegacyUniform
            && keys.iter().any(|k| k.direction == SortDirection::Descending)
        {
            for key in &mut keys {
                key.direction = SortDirection::Descending;
            }
        }

        Ok(Self { keys })
    }

    /// Returns the sort keys.
    pub fn keys(&self) -> &[SortKey] {
        &self.keys
    }

    /// Consumes the spec, returning its keys.
    pub fn into_keys(self) -> Vec<SortKey> {
        self.keys
    }

    /// Returns true if no sort was requested.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
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
            .with_field(FieldDef::text("desc").not_sortable())
    }

    fn parse(query: &str, mode: SortDirectionMode) -> Result<SortSpec, ParseError> {
        SortSpec::parse(&QueryParams::parse(query), &place(), mode)
    }

    #[test]
    fn test_per_field_directions() {
        let spec = parse("sort=dpt,-label,id", SortDirectionMode::PerField).unwrap();
        assert_eq!(
            spec.keys(),
            &[SortKey::asc("dpt"), SortKey::desc("label"), SortKey::asc("id")]
        );
    }

    #[test]
    fn test_legacy_uniform_direction() {
        let spec = parse("sort=dpt,-label", SortDirectionMode::LegacyUniform).unwrap();
        assert_eq!(spec.keys(), &[SortKey::desc("dpt"), SortKey::desc("label")]);

        let spec = parse("sort=dpt,label", SortDirectionMode::LegacyUniform).unwrap();
        assert_eq!(spec.keys(), &[SortKey::asc("dpt"), SortKey::asc("label")]);
    }

    #[test]
    fn test_absent_sort_is_empty() {
        let spec = parse("filter[dpt]=01", SortDirectionMode::PerField).unwrap();
        assert!(spec.is_empty());
    }

    #[test]
    fn test_repeated_sort_keys_concatenate() {
        let spec = parse("sort=dpt&sort=-label", SortDirectionMode::PerField).unwrap();
        assert_eq!(spec.into_keys(), vec![SortKey::asc("dpt"), SortKey::desc("label")]);
    }

    #[test]
    fn test_rejections() {
        assert!(matches!(
            parse("sort=population", SortDirectionMode::PerField),
            Err(ParseError::UnknownField { .. })
        ));
        assert!(matches!(
            parse("sort=-desc", SortDirectionMode::PerField),
            Err(ParseError::NotSortable { .. })
        ));
        assert!(matches!(
            parse("sort=dpt,,label", SortDirectionMode::PerField),
            Err(ParseError::EmptySortField { .. })
        ));
        assert!(matches!(
            parse("sort=-", SortDirectionMode::PerField),
            Err(ParseError::EmptySortField { .. })
        ));
    }
}
