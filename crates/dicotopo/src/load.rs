//! Bulk loading of gazetteer entities from a JSON dump.
//!
//! The dump is a JSON array of `{"entity_type", "id", "attributes"}`
//! objects, the serialized form of [`StoredEntity`].

use std::path::Path;

use anyhow::{Context, bail};
use dicotopo_rest::schema::ResourceRegistry;
use dicotopo_store::core::EntityWriter;
use dicotopo_store::types::StoredEntity;
use tracing::info;

/// Parses a dump, rejecting entities whose type is not served.
pub fn parse_entities(raw: &str, registry: &ResourceRegistry) -> anyhow::Result<Vec<StoredEntity>> {
    let entities: Vec<StoredEntity> =
        serde_json::from_str(raw).context("dump must be a JSON array of entities")?;

    for entity in &entities {
        if registry.get(entity.entity_type()).is_none() {
            bail!(
                "entity {} has unknown type '{}'",
                entity.id(),
                entity.entity_type()
            );
        }
    }

    Ok(entities)
}

/// Reads a dump from disk and upserts every entity into the store.
pub async fn load_file<W>(writer: &W, path: &Path, registry: &ResourceRegistry) -> anyhow::Result<usize>
where
    W: EntityWriter,
{
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let entities = parse_entities(&raw, registry)?;
    let count = entities.len();

    writer.insert_many(entities).await?;
    info!(path = %path.display(), count, "Loaded entities");

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::gazetteer_registry;

    #[test]
    fn test_parse_dump() {
        let raw = r#"[
            {"entity_type": "place", "id": "DT01-00001", "attributes": {"label": "Abergement", "dpt": "01"}},
            {"entity_type": "commune", "id": "01001", "attributes": {"label": "L'Abergement-Clémenciat"}}
        ]"#;
        let entities = parse_entities(raw, &gazetteer_registry().unwrap()).unwrap();
        assert_eq!(entities.len(), 2);
        assert_eq!(entities[0].id(), "DT01-00001");
        assert_eq!(entities[1].entity_type(), "commune");
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let raw = r#"[{"entity_type": "river", "id": "R1", "attributes": {}}]"#;
        let err = parse_entities(raw, &gazetteer_registry().unwrap()).unwrap_err();
        assert!(err.to_string().contains("river"));
    }

    #[test]
    fn test_dump_must_be_an_array() {
        assert!(parse_entities(r#"{"id": "P1"}"#, &gazetteer_registry().unwrap()).is_err());
    }

    #[tokio::test]
    async fn test_load_file_into_sqlite() {
        use dicotopo_store::backends::sqlite::SqliteBackend;
        use dicotopo_store::core::EntityStore;
        use std::io::Write;

        let mut dump = tempfile::NamedTempFile::new().unwrap();
        write!(
            dump,
            r#"[{{"entity_type": "place", "id": "P1", "attributes": {{"label": "Annecy"}}}}]"#
        )
        .unwrap();

        let backend = SqliteBackend::in_memory().unwrap();
        backend.init_schema().unwrap();
        let loaded = load_file(&backend, dump.path(), &gazetteer_registry().unwrap())
            .await
            .unwrap();

        assert_eq!(loaded, 1);
        let place = backend.read("place", "P1").await.unwrap().unwrap();
        assert_eq!(place.attribute("label"), Some(&serde_json::json!("Annecy")));
    }
}
