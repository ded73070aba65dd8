//! Integration tests for external model downloads
//!
//! Uses an in-memory downloader in place of the network.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use taxon_foundation::{ErrorKind, Result};
use taxon_model::builder::{ClassBuilder, ModelBuilder, PropertyBuilder};
use taxon_model::{Model, ModelDownloader, ModelManager, missing_dependency};

const PARTY_URI: &str = "https://models.example.com/party@1.0.0.json";
const ADDRESS_URI: &str = "https://models.example.com/address@1.0.0.json";

#[derive(Default)]
struct MemoryDownloader {
    models: HashMap<String, String>,
    requests: Mutex<Vec<String>>,
}

impl MemoryDownloader {
    fn with(mut self, uri: &str, model: &Model) -> Self {
        self.models
            .insert(uri.to_string(), serde_json::to_string(model).unwrap());
        self
    }

    fn requests(&self) -> Vec<String> {
        let mut requests = self.requests.lock().unwrap().clone();
        requests.sort();
        requests
    }
}

#[async_trait]
impl ModelDownloader for MemoryDownloader {
    async fn download(&self, uri: &str) -> Result<String> {
        self.requests.lock().unwrap().push(uri.to_string());
        self.models
            .get(uri)
            .cloned()
            .ok_or_else(|| missing_dependency(uri, "404 not found"))
    }
}

fn party() -> Model {
    ModelBuilder::new("org.party@1.0.0")
        .import_external("org.address@1.0.0", "Address", ADDRESS_URI)
        .declaration(
            ClassBuilder::participant("Party")
                .identified_by("partyId")
                .property(PropertyBuilder::string("partyId"))
                .property(PropertyBuilder::object("address", "Address"))
                .build(),
        )
        .build()
}

fn address() -> Model {
    ModelBuilder::new("org.address@1.0.0")
        .declaration(
            ClassBuilder::concept("Address")
                .identified()
                .property(PropertyBuilder::string("street"))
                .build(),
        )
        .build()
}

fn contract() -> Model {
    ModelBuilder::new("org.contract@1.0.0")
        .import_external("org.party@1.0.0", "Party", PARTY_URI)
        .declaration(
            ClassBuilder::asset("Contract")
                .identified()
                .property(PropertyBuilder::relationship("buyer", "Party"))
                .property(PropertyBuilder::relationship("seller", "Party"))
                .build(),
        )
        .build()
}

#[tokio::test]
async fn fetches_dependency_graph() {
    let mut manager = ModelManager::new();
    manager.add_model(contract(), Some("contract.json")).unwrap();
    let downloader = MemoryDownloader::default()
        .with(PARTY_URI, &party())
        .with(ADDRESS_URI, &address());

    let files = manager.update_external_models(&downloader).await.unwrap();
    assert_eq!(files.len(), 2);
    assert!(files.iter().all(|f| f.is_external()));
    assert_eq!(
        downloader.requests(),
        vec![ADDRESS_URI.to_string(), PARTY_URI.to_string()]
    );
    assert!(manager.get_type("org.address@1.0.0.Address").is_ok());
}

#[tokio::test]
async fn refresh_replaces_external_files() {
    let mut manager = ModelManager::new();
    manager.add_model(contract(), None).unwrap();
    let downloader = MemoryDownloader::default()
        .with(PARTY_URI, &party())
        .with(ADDRESS_URI, &address());

    manager.update_external_models(&downloader).await.unwrap();
    let files = manager.update_external_models(&downloader).await.unwrap();
    assert_eq!(files.len(), 2);
    assert_eq!(manager.get_model_files(false).len(), 3);
}

#[tokio::test]
async fn unreachable_dependency_without_cache_fails() {
    let mut manager = ModelManager::new();
    manager.add_model(contract(), None).unwrap();
    let downloader = MemoryDownloader::default().with(PARTY_URI, &party());

    let err = manager.update_external_models(&downloader).await.unwrap_err();
    assert!(err.is_missing_dependency());
    assert!(matches!(
        err.kind,
        ErrorKind::MissingDependency { ref uri, .. } if uri == ADDRESS_URI
    ));
    assert_eq!(manager.get_model_files(false).len(), 1);
}

#[tokio::test]
async fn unreachable_dependency_with_cache_succeeds() {
    let mut manager = ModelManager::new();
    manager.add_model(contract(), None).unwrap();
    let online = MemoryDownloader::default()
        .with(PARTY_URI, &party())
        .with(ADDRESS_URI, &address());
    manager.update_external_models(&online).await.unwrap();

    let offline = MemoryDownloader::default();
    let files = manager.update_external_models(&offline).await.unwrap();
    assert!(files.is_empty());
    assert!(manager.get_type("org.party@1.0.0.Party").is_ok());
}
