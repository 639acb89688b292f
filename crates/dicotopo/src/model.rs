//! Resource types served by the gazetteer.

use dicotopo_rest::schema::{
    FieldDef, RegistryError, RelationshipDef, ResourceRegistry, ResourceType,
};

/// A place of the gazetteer, keyed by its dicotopo identifier.
fn place() -> ResourceType {
    ResourceType::new("place", "places")
        .with_fields([
            FieldDef::text("label"),
            FieldDef::text("country"),
            FieldDef::text("dpt"),
            FieldDef::text("commune_insee"),
            FieldDef::text("localization_commune_insee"),
            FieldDef::text("localization_certainty"),
            FieldDef::text("desc").not_filterable().not_sortable(),
            FieldDef::integer("num_start_page"),
        ])
        .with_relationship(RelationshipDef::to_many_query(
            "old-labels",
            "place-old-label",
            "place_id",
        ))
        .with_relationship(RelationshipDef::to_one("commune", "commune", "commune_insee"))
        .with_relationship(RelationshipDef::to_many_list(
            "linked-places",
            "place",
            "linked_places",
        ))
}

/// An attested historical form of a place name.
fn place_old_label() -> ResourceType {
    ResourceType::new("place-old-label", "place-old-labels")
        .with_fields([
            FieldDef::text("rich_label"),
            FieldDef::text("text_date"),
            FieldDef::text("rich_date"),
            FieldDef::text("reference").not_sortable(),
            FieldDef::text("place_id"),
        ])
        .with_relationship(RelationshipDef::to_one("place", "place", "place_id"))
}

/// An INSEE commune, keyed by its INSEE code.
fn commune() -> ResourceType {
    ResourceType::new("commune", "communes").with_fields([
        FieldDef::text("label"),
        FieldDef::text("dpt"),
        FieldDef::text("region"),
    ])
}

/// Builds the registry of every served type.
pub fn gazetteer_registry() -> Result<ResourceRegistry, RegistryError> {
    ResourceRegistry::new()
        .with(place())?
        .with(place_old_label())?
        .with(commune())
}
