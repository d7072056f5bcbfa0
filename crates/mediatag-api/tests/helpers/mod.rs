//! Test helpers: build the router over local storage, an in-memory catalog and mock taggers.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use mediatag_api::constants::API_PREFIX;
use mediatag_api::setup::routes;
use mediatag_api::state::AppState;
use mediatag_core::{Config, TaggingSettings};
use mediatag_db::InMemoryCatalogStore;
use mediatag_services::MediaLibrary;
use mediatag_storage::LocalStorage;
use mediatag_tagging::test_helpers::MockClients;
use mediatag_tagging::{KeywordExpander, TaggingService};
use tempfile::TempDir;

/// API path with the version prefix (e.g. `/api/v0/files`).
pub fn api_path(path: &str) -> String {
    format!("{}{}", API_PREFIX, path)
}

pub struct TestApp {
    pub server: TestServer,
    pub mocks: MockClients,
    pub catalog: Arc<InMemoryCatalogStore>,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }
}

fn test_config(storage_path: &str) -> Config {
    let storage_path = storage_path.to_string();
    Config::from_lookup(move |name| match name {
        "STORAGE_BACKEND" => Some("local".to_string()),
        "LOCAL_STORAGE_PATH" => Some(storage_path.clone()),
        "LOCAL_STORAGE_BASE_URL" => Some("http://localhost:4000/media".to_string()),
        "CATALOG_BACKEND" => Some("memory".to_string()),
        "TAGGING_BACKEND" => Some("disabled".to_string()),
        "MAX_UPLOAD_SIZE_MB" => Some("1".to_string()),
        _ => None,
    })
    .expect("Failed to build test config")
}

pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(MockClients::succeeding()).await
}

pub async fn setup_test_app_with(mocks: MockClients) -> TestApp {
    build_test_app(mocks, None).await
}

/// Test app whose search expands queries through `expander`.
pub async fn setup_test_app_with_expander(expander: Arc<dyn KeywordExpander>) -> TestApp {
    build_test_app(MockClients::succeeding(), Some(expander)).await
}

async fn build_test_app(mocks: MockClients, expander: Option<Arc<dyn KeywordExpander>>) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let storage_path = temp_dir.path().join("media").display().to_string();
    let config = test_config(&storage_path);

    let storage = Arc::new(
        LocalStorage::new(storage_path, "http://localhost:4000/media".to_string())
            .await
            .expect("Failed to create local storage"),
    );
    let catalog = Arc::new(InMemoryCatalogStore::new());
    let tagging =
        TaggingService::new(mocks.clients(), storage.clone(), &TaggingSettings::default());
    let library = MediaLibrary::new(storage, catalog.clone(), tagging, Duration::from_secs(3600));
    let library = match expander {
        Some(expander) => library.with_keyword_expander(expander),
        None => library,
    };

    let router = routes::setup_routes(&config, AppState::new(library, config.clone()))
        .expect("Failed to build routes");
    let server = TestServer::new(router).expect("Failed to start test server");

    TestApp {
        server,
        mocks,
        catalog,
        _temp_dir: temp_dir,
    }
}

/// Upload `data` as the `file` field and return the response JSON.
pub async fn upload(client: &TestServer, file_name: &str, data: &[u8]) -> serde_json::Value {
    let part = Part::bytes(bytes::Bytes::copy_from_slice(data)).file_name(file_name.to_string());
    let response = client
        .post(&api_path("/files"))
        .multipart(MultipartForm::new().add_part("file", part))
        .await;

    assert_eq!(response.status_code(), 201, "upload of {} failed", file_name);
    response.json()
}
