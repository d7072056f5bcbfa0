use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mediatag_core::{AppError, MediaAsset, TaggingSettings};
use mediatag_db::{CatalogStore, InMemoryCatalogStore};
use mediatag_services::MediaLibrary;
use mediatag_storage::key_epoch;
use mediatag_tagging::test_helpers::{
    MockClients, MockImageLabels, MockKeyPhrases, MockKeywordExpander, MockStorage,
    MockTranscriptionJobs, MockVideoLabelJobs,
};
use mediatag_tagging::{TaggingService, VideoLabelJobStatus};

const TTL: Duration = Duration::from_secs(3600);

struct Harness {
    library: MediaLibrary,
    storage: Arc<MockStorage>,
    catalog: Arc<InMemoryCatalogStore>,
}

fn harness(mocks: &MockClients) -> Harness {
    let storage = Arc::new(MockStorage::new());
    let catalog = Arc::new(InMemoryCatalogStore::new());
    let tagging =
        TaggingService::new(mocks.clients(), storage.clone(), &TaggingSettings::default());
    Harness {
        library: MediaLibrary::new(storage.clone(), catalog.clone(), tagging, TTL),
        storage,
        catalog,
    }
}

/// Catalog whose writes always fail
struct BrokenCatalog;

#[async_trait]
impl CatalogStore for BrokenCatalog {
    async fn upsert(&self, _asset: &MediaAsset) -> Result<(), AppError> {
        Err(AppError::Internal("connection refused".to_string()))
    }

    async fn get(&self, _key: &str) -> Result<Option<MediaAsset>, AppError> {
        Ok(None)
    }

    async fn scan(&self) -> Result<Vec<MediaAsset>, AppError> {
        Err(AppError::Internal("connection refused".to_string()))
    }

    async fn delete(&self, _key: &str) -> Result<bool, AppError> {
        Err(AppError::Internal("connection refused".to_string()))
    }

    fn backend_name(&self) -> &'static str {
        "broken"
    }
}

#[tokio::test]
async fn photo_is_stored_tagged_and_catalogued() {
    let mut mocks = MockClients::succeeding();
    mocks.image_labels = Arc::new(MockImageLabels::returning(&["Beach", "Sea", "Sky"]));
    let h = harness(&mocks);

    let asset = h
        .library
        .upload_bytes("photo.jpg", b"jpeg bytes".to_vec())
        .await
        .unwrap();

    assert_eq!(asset.tags, vec!["Beach", "Sea", "Sky"]);
    assert_eq!(asset.original_name, "photo.jpg");
    assert_eq!(asset.extension, "jpg");
    assert!(asset.key.ends_with("_photo.jpg"));
    assert_eq!(key_epoch(&asset.key), Some(asset.created_at));
    assert!(asset.stored_url.contains("X-Amz-Expires=3600"));

    let calls = mocks.image_labels.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!((calls[0].2, calls[0].3), (5, 80.0));

    assert_eq!(h.storage.get_file(&asset.key), Some(b"jpeg bytes".to_vec()));
    assert_eq!(h.storage.content_type(&asset.key).as_deref(), Some("image/jpeg"));
    assert_eq!(h.catalog.get(&asset.key).await.unwrap(), Some(asset));
}

#[tokio::test(start_paused = true)]
async fn video_labels_are_deduplicated() {
    let mut mocks = MockClients::succeeding();
    mocks.video_labels = Arc::new(MockVideoLabelJobs::scripted(vec![
        Ok(VideoLabelJobStatus::running()),
        Ok(VideoLabelJobStatus::running()),
        Ok(VideoLabelJobStatus::succeeded(&["Car", "car", "Tree"])),
    ]));
    let h = harness(&mocks);

    let asset = h
        .library
        .upload_bytes("clip.mp4", vec![0; 16])
        .await
        .unwrap();

    assert_eq!(asset.tags, vec!["Car", "Tree"]);
    assert_eq!(mocks.video_labels.status_queries(), 3);
    assert_eq!(mocks.video_labels.submissions()[0].3, 70.0);
}

#[tokio::test]
async fn text_note_is_tagged_with_key_phrases() {
    let mut mocks = MockClients::succeeding();
    mocks.key_phrases = Arc::new(MockKeyPhrases::returning(&["Paris", "Paris", "France"]));
    let h = harness(&mocks);

    let asset = h
        .library
        .upload_bytes("note.txt", b"Paris, Paris, France".to_vec())
        .await
        .unwrap();

    assert_eq!(asset.tags, vec!["Paris", "France"]);
    assert_eq!(
        mocks.key_phrases.texts(),
        vec!["Paris, Paris, France".to_string()]
    );
}

#[tokio::test(start_paused = true)]
async fn failed_transcription_still_catalogues_the_asset() {
    let mut mocks = MockClients::succeeding();
    mocks.transcription = Arc::new(MockTranscriptionJobs::failing_after(59, "corrupt audio"));
    let h = harness(&mocks);

    let asset = h
        .library
        .upload_bytes("talk.mp3", vec![1, 2, 3])
        .await
        .unwrap();

    assert!(asset.tags.is_empty());
    assert_eq!(mocks.transcription.status_queries(), 60);
    assert_eq!(mocks.key_phrases.call_count(), 0);
    assert_eq!(h.catalog.get(&asset.key).await.unwrap(), Some(asset));
}

#[tokio::test]
async fn unknown_extension_is_catalogued_without_backend_calls() {
    let mocks = MockClients::succeeding();
    let h = harness(&mocks);

    let asset = h
        .library
        .upload_bytes("report.pdf", b"%PDF".to_vec())
        .await
        .unwrap();

    assert!(asset.tags.is_empty());
    assert_eq!(asset.extension, "pdf");
    assert_eq!(mocks.total_calls(), 0);
    assert_eq!(h.catalog.len().await, 1);
}

#[tokio::test]
async fn backend_failures_never_fail_the_upload() {
    let mocks = MockClients::failing();
    let h = harness(&mocks);

    for name in ["a.jpg", "b.md", "c.wav", "d.mov"] {
        let asset = h.library.upload_bytes(name, b"data".to_vec()).await.unwrap();
        assert!(asset.tags.is_empty(), "{} should have no tags", name);
    }
    assert_eq!(h.catalog.len().await, 4);
}

#[tokio::test]
async fn storage_failure_is_fatal_and_nothing_is_catalogued() {
    let mocks = MockClients::succeeding();
    let h = harness(&mocks);
    h.storage.fail_puts(true);

    let err = h
        .library
        .upload_bytes("photo.jpg", b"x".to_vec())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Storage(_)));
    assert!(h.catalog.is_empty().await);
    assert_eq!(mocks.total_calls(), 0);
}

#[tokio::test]
async fn catalog_failure_still_returns_the_asset() {
    let mocks = MockClients::succeeding();
    let storage = Arc::new(MockStorage::new());
    let tagging =
        TaggingService::new(mocks.clients(), storage.clone(), &TaggingSettings::default());
    let library = MediaLibrary::new(storage.clone(), Arc::new(BrokenCatalog), tagging, TTL);

    let asset = library
        .upload_bytes("photo.jpg", b"x".to_vec())
        .await
        .unwrap();

    assert_eq!(asset.tags, vec!["Dog", "Animal", "Pet"]);
    assert!(storage.has_file(&asset.key));
    assert!(library.list_catalog().await.is_err());
}

#[tokio::test]
async fn presign_failure_falls_back_to_object_url() {
    let mocks = MockClients::succeeding();
    let h = harness(&mocks);
    h.storage.fail_presigning(true);

    let asset = h
        .library
        .upload_bytes("photo.png", b"x".to_vec())
        .await
        .unwrap();

    assert_eq!(asset.stored_url, format!("https://test-bucket.mock/{}", asset.key));
}

#[tokio::test]
async fn upload_from_path_uses_the_file_name() {
    let mocks = MockClients::succeeding();
    let h = harness(&mocks);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Holiday.JPG");
    std::fs::write(&path, b"jpeg").unwrap();

    let asset = h.library.upload_and_tag(&path).await.unwrap();

    assert_eq!(asset.original_name, "Holiday.JPG");
    assert_eq!(asset.extension, "jpg");
    assert_eq!(asset.tags, vec!["Dog", "Animal", "Pet"]);
}

#[tokio::test]
async fn missing_input_file_is_an_error() {
    let mocks = MockClients::succeeding();
    let h = harness(&mocks);
    let dir = tempfile::tempdir().unwrap();

    let err = h
        .library
        .upload_and_tag(&dir.path().join("nope.jpg"))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::InvalidInput(_)));
    assert!(h.storage.keys().is_empty());
}

#[tokio::test]
async fn search_matches_tags_and_names_case_insensitively() {
    let mocks = MockClients::succeeding();
    let h = harness(&mocks);
    let dog = h.library.upload_bytes("walk.jpg", b"x".to_vec()).await.unwrap();
    let report = h.library.upload_bytes("Quarterly.pdf", b"x".to_vec()).await.unwrap();

    let by_tag = h.library.search_catalog("ANIMAL").await.unwrap();
    assert_eq!(by_tag.len(), 1);
    assert_eq!(by_tag[0].key, dog.key);

    let by_name = h.library.search_catalog("quarter").await.unwrap();
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name[0].key, report.key);

    assert!(h.library.search_catalog("zebra").await.unwrap().is_empty());
}

#[tokio::test]
async fn expanded_keywords_match_whole_tags() {
    let mut mocks = MockClients::succeeding();
    mocks.key_phrases = Arc::new(MockKeyPhrases::returning(&["Electronics", "Circuit design"]));
    let expander = Arc::new(MockKeywordExpander::returning(&["gadgets", "electronics"]));
    let h = harness(&mocks);
    let library = h.library.clone().with_keyword_expander(expander.clone());

    let _photo = library.upload_bytes("walk.jpg", b"x".to_vec()).await.unwrap();
    let notes = library.upload_bytes("notes.txt", b"soldering".to_vec()).await.unwrap();

    let results = library
        .search_catalog_detailed("an audio that mentioned gadgets")
        .await
        .unwrap();

    assert_eq!(results.keywords, vec!["gadgets", "electronics"]);
    assert_eq!(results.assets.len(), 1);
    assert_eq!(results.assets[0].key, notes.key);
    assert_eq!(expander.queries(), vec!["an audio that mentioned gadgets"]);

    // Without the expander the same query finds nothing
    assert!(h
        .library
        .search_catalog("an audio that mentioned gadgets")
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn expansion_failure_falls_back_to_substring_search() {
    let mocks = MockClients::succeeding();
    let h = harness(&mocks);
    let library = h
        .library
        .clone()
        .with_keyword_expander(Arc::new(MockKeywordExpander::failing()));
    let dog = library.upload_bytes("walk.jpg", b"x".to_vec()).await.unwrap();

    let results = library.search_catalog_detailed("anim").await.unwrap();

    assert!(results.keywords.is_empty());
    assert_eq!(results.assets.len(), 1);
    assert_eq!(results.assets[0].key, dog.key);
}

#[tokio::test]
async fn expanded_keywords_do_not_match_partial_tags() {
    let mocks = MockClients::succeeding();
    let expander = Arc::new(MockKeywordExpander::returning(&["Do", "Animals"]));
    let h = harness(&mocks);
    let library = h.library.clone().with_keyword_expander(expander);
    library.upload_bytes("walk.jpg", b"x".to_vec()).await.unwrap();

    let results = library.search_catalog_detailed("zebra crossing").await.unwrap();

    assert_eq!(results.keywords, vec!["Do", "Animals"]);
    assert!(results.assets.is_empty());
}

#[tokio::test]
async fn listing_regenerates_urls() {
    let mocks = MockClients::succeeding();
    let h = harness(&mocks);
    let asset = h.library.upload_bytes("a.jpg", b"x".to_vec()).await.unwrap();

    let mut stale = asset.clone();
    stale.stored_url = "https://expired.example/a.jpg".to_string();
    h.catalog.upsert(&stale).await.unwrap();

    let listed = h.library.list_catalog().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].stored_url, asset.stored_url);

    let fetched = h.library.get_asset(&asset.key).await.unwrap().unwrap();
    assert_eq!(fetched.stored_url, asset.stored_url);
    assert!(h.library.get_asset("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn delete_removes_object_and_row() {
    let mocks = MockClients::succeeding();
    let h = harness(&mocks);
    let asset = h.library.upload_bytes("a.jpg", b"x".to_vec()).await.unwrap();

    assert!(h.library.delete_asset(&asset.key).await);
    assert!(!h.storage.has_file(&asset.key));
    assert!(h.catalog.get(&asset.key).await.unwrap().is_none());
}

#[tokio::test]
async fn delete_attempts_both_halves_and_reports_failure() {
    let mocks = MockClients::succeeding();
    let h = harness(&mocks);
    let asset = h.library.upload_bytes("a.jpg", b"x".to_vec()).await.unwrap();
    h.storage.fail_deletes(true);

    assert!(!h.library.delete_asset(&asset.key).await);
    assert!(h.storage.has_file(&asset.key));
    assert!(h.catalog.get(&asset.key).await.unwrap().is_none());
}

#[tokio::test]
async fn odd_file_names_get_storage_safe_keys() {
    let mocks = MockClients::succeeding();
    let h = harness(&mocks);

    let asset = h
        .library
        .upload_bytes("song [live] #1.jpg", b"jpeg".to_vec())
        .await
        .unwrap();

    assert_eq!(asset.original_name, "song [live] #1.jpg");
    assert_eq!(asset.extension, "jpg");
    assert!(asset.key.ends_with("_song--live---1.jpg"), "key {}", asset.key);
    assert!(h.storage.has_file(&asset.key));

    // The label service is asked for exactly the key the object was stored under
    let calls = mocks.image_labels.calls();
    assert_eq!(calls[0].1, asset.key);
    assert_eq!(asset.tags, vec!["Dog", "Animal", "Pet"]);
}
