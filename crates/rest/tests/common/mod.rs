//! Shared fixtures for route tests.
//!
//! A small gazetteer: 23 places cycling through three statuses and two
//! departments, old labels for P01, a linked-place list on P01 and one
//! commune.

#![allow(dead_code)]

use async_trait::async_trait;
use axum_test::{TestResponse, TestServer};
use serde_json::{Value, json};

use dicotopo_rest::pagination::{PageLimits, PageRequest};
use dicotopo_rest::query::QueryParams;
use dicotopo_rest::schema::{FieldDef, RelationshipDef, ResourceRegistry, ResourceType};
use dicotopo_rest::{ServerConfig, create_app};
use dicotopo_store::backends::memory::MemoryBackend;
use dicotopo_store::core::EntityStore;
use dicotopo_store::error::{BackendError, StoreResult};
use dicotopo_store::types::{EntityQuery, Slice, StoredEntity};

/// Path every resource route hangs off under the test configuration.
pub const API: &str = "/dico-topo/api/1.0";

/// Absolute URL prefix of generated links.
pub const LINK_API: &str = "http://localhost/dico-topo/api/1.0";

pub const STATUSES: [&str; 3] = ["active", "pending", "archived"];

pub fn registry() -> ResourceRegistry {
    let place = ResourceType::new("place", "places")
        .with_fields([
            FieldDef::text("label"),
            FieldDef::text("dpt"),
            FieldDef::text("status"),
            FieldDef::text("commune_insee"),
            FieldDef::integer("num_start_page"),
            FieldDef::text("desc").not_filterable().not_sortable(),
        ])
        .with_relationship(RelationshipDef::to_many_query(
            "old-labels",
            "place-old-label",
            "place_id",
        ))
        .with_relationship(RelationshipDef::to_many_list(
            "linked-places",
            "place",
            "linked_places",
        ))
        .with_relationship(RelationshipDef::to_one("commune", "commune", "commune_insee"));

    let old_label = ResourceType::new("place-old-label", "place-old-labels")
        .with_fields([FieldDef::text("rich_label"), FieldDef::text("place_id")])
        .with_relationship(RelationshipDef::to_one("place", "place", "place_id"));

    let commune = ResourceType::new("commune", "communes").with_field(FieldDef::text("name"));

    ResourceRegistry::new()
        .with(place)
        .and_then(|r| r.with(old_label))
        .and_then(|r| r.with(commune))
        .expect("test registry must be consistent")
}

pub fn entity(entity_type: &str, id: &str, attributes: Value) -> StoredEntity {
    StoredEntity::from_json(entity_type, id, attributes).expect("attributes must be an object")
}

pub fn place_id(n: usize) -> String {
    format!("P{:02}", n)
}

pub fn fixtures() -> Vec<StoredEntity> {
    let mut entities = Vec::new();
    for i in 0..23 {
        let n = i + 1;
        let mut attributes = json!({
            "label": format!("Place {:02}", n),
            "dpt": if i % 2 == 0 { "01" } else { "74" },
            "status": STATUSES[i % 3],
            "num_start_page": 100 - i,
            "desc": "Lieu-dit",
        });
        if n == 1 {
            attributes["commune_insee"] = json!("01001");
            attributes["linked_places"] = json!(["P02", "P03", "P04", "P05", "P06"]);
        }
        entities.push(entity("place", &place_id(n), attributes));
    }
    for n in 1..=3 {
        entities.push(entity(
            "place-old-label",
            &format!("L{}", n),
            json!({"rich_label": format!("Villa {}", n), "place_id": "P01"}),
        ));
    }
    entities.push(entity("commune", "01001", json!({"name": "L'Abergement-Clémenciat"})));
    entities
}

/// Message every failing call of [`FailingStore`] reports.
pub const STORE_FAILURE: &str = "failing: connection failed: boom";

/// Reads single entities from the fixtures but fails every count, fetch and
/// batch read.
pub struct FailingStore {
    inner: MemoryBackend,
}

impl FailingStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryBackend::with_entities(fixtures()),
        }
    }

    fn failure() -> BackendError {
        BackendError::ConnectionFailed {
            backend_name: "failing".to_string(),
            message: "boom".to_string(),
        }
    }
}

#[async_trait]
impl EntityStore for FailingStore {
    fn backend_name(&self) -> &'static str {
        "failing"
    }

    async fn read(&self, entity_type: &str, id: &str) -> StoreResult<Option<StoredEntity>> {
        self.inner.read(entity_type, id).await
    }

    async fn read_many(&self, _entity_type: &str, _ids: &[String]) -> StoreResult<Vec<StoredEntity>> {
        Err(Self::failure().into())
    }

    async fn count(&self, _query: &EntityQuery) -> StoreResult<u64> {
        Err(Self::failure().into())
    }

    async fn fetch(&self, _query: &EntityQuery, _slice: Option<Slice>) -> StoreResult<Vec<StoredEntity>> {
        Err(Self::failure().into())
    }
}

pub fn server_with<S>(store: S, config: ServerConfig) -> TestServer
where
    S: EntityStore + 'static,
{
    let app = create_app(store, registry(), config).expect("Failed to create app");
    TestServer::new(app).expect("Failed to create test server")
}

pub fn server() -> TestServer {
    server_with(MemoryBackend::with_entities(fixtures()), ServerConfig::for_testing())
}

pub async fn get_json(server: &TestServer, path: &str) -> (TestResponse, Value) {
    let response = server.get(path).await;
    let body = response.json::<Value>();
    (response, body)
}

pub fn ids(body: &Value) -> Vec<String> {
    body["data"]
        .as_array()
        .expect("data must be an array")
        .iter()
        .map(|item| item["id"].as_str().unwrap().to_string())
        .collect()
}

/// Parses the page a link points at.
pub fn page_of(link: &Value) -> (u64, u64) {
    let link = link.as_str().expect("link must be a string");
    let (_, query) = link.split_once('?').expect("link must carry a query");
    let request = PageRequest::from_params(&QueryParams::parse(query), PageLimits::new(10, 50))
        .unwrap()
        .expect("link must carry page parameters");
    (request.number(), request.size())
}
