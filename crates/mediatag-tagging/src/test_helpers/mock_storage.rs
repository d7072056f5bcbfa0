//! In-memory `Storage` for tests

use async_trait::async_trait;
use mediatag_storage::{Storage, StorageBackend, StorageError, StorageResult};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const MOCK_BUCKET: &str = "test-bucket";

/// Objects live in a shared map; each operation can be switched to fail.
#[derive(Clone, Default)]
pub struct MockStorage {
    files: Arc<Mutex<HashMap<String, (Vec<u8>, String)>>>,
    fail_put: Arc<AtomicBool>,
    fail_get: Arc<AtomicBool>,
    fail_delete: Arc<AtomicBool>,
    fail_presign: Arc<AtomicBool>,
}

impl MockStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_file(&self, key: &str, data: Vec<u8>) {
        self.files.lock().unwrap().insert(
            key.to_string(),
            (data, "application/octet-stream".to_string()),
        );
    }

    pub fn has_file(&self, key: &str) -> bool {
        self.files.lock().unwrap().contains_key(key)
    }

    pub fn get_file(&self, key: &str) -> Option<Vec<u8>> {
        self.files.lock().unwrap().get(key).map(|(data, _)| data.clone())
    }

    pub fn content_type(&self, key: &str) -> Option<String> {
        self.files.lock().unwrap().get(key).map(|(_, ct)| ct.clone())
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.files.lock().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn fail_puts(&self, fail: bool) {
        self.fail_put.store(fail, Ordering::SeqCst);
    }

    pub fn fail_gets(&self, fail: bool) {
        self.fail_get.store(fail, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_delete.store(fail, Ordering::SeqCst);
    }

    pub fn fail_presigning(&self, fail: bool) {
        self.fail_presign.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl Storage for MockStorage {
    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> StorageResult<()> {
        if self.fail_put.load(Ordering::SeqCst) {
            return Err(StorageError::UploadFailed("mock put failure".to_string()));
        }
        self.files
            .lock()
            .unwrap()
            .insert(key.to_string(), (data, content_type.to_string()));
        Ok(())
    }

    async fn get(&self, key: &str) -> StorageResult<Vec<u8>> {
        if self.fail_get.load(Ordering::SeqCst) {
            return Err(StorageError::DownloadFailed("mock get failure".to_string()));
        }
        self.get_file(key)
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(StorageError::DeleteFailed("mock delete failure".to_string()));
        }
        self.files.lock().unwrap().remove(key);
        Ok(())
    }

    async fn presigned_get_url(&self, key: &str, expires_in: Duration) -> StorageResult<String> {
        if self.fail_presign.load(Ordering::SeqCst) {
            return Err(StorageError::BackendError("mock presign failure".to_string()));
        }
        Ok(format!(
            "{}?X-Amz-Expires={}",
            self.object_url(key),
            expires_in.as_secs()
        ))
    }

    fn object_url(&self, key: &str) -> String {
        format!("https://{}.mock/{}", MOCK_BUCKET, key)
    }

    fn bucket(&self) -> &str {
        MOCK_BUCKET
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
