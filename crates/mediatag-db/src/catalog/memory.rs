use std::collections::HashMap;

use async_trait::async_trait;
use mediatag_core::{AppError, MediaAsset};
use tokio::sync::RwLock;

use super::CatalogStore;

/// Process-local catalog. Contents are lost on restart.
#[derive(Default)]
pub struct InMemoryCatalogStore {
    rows: RwLock<HashMap<String, MediaAsset>>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn upsert(&self, asset: &MediaAsset) -> Result<(), AppError> {
        self.rows
            .write()
            .await
            .insert(asset.key.clone(), asset.clone());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<MediaAsset>, AppError> {
        Ok(self.rows.read().await.get(key).cloned())
    }

    async fn scan(&self) -> Result<Vec<MediaAsset>, AppError> {
        let mut assets: Vec<MediaAsset> = self.rows.read().await.values().cloned().collect();
        assets.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.key.cmp(&b.key))
        });
        Ok(assets)
    }

    async fn delete(&self, key: &str) -> Result<bool, AppError> {
        Ok(self.rows.write().await.remove(key).is_some())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(key: &str, created_at: i64, tags: &[&str]) -> MediaAsset {
        MediaAsset {
            key: key.to_string(),
            original_name: key.rsplit('_').next().unwrap_or(key).to_string(),
            extension: "jpg".to_string(),
            stored_url: format!("https://example.test/{}", key),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            created_at,
        }
    }

    #[tokio::test]
    async fn upsert_replaces_existing_row() {
        let store = InMemoryCatalogStore::new();
        store.upsert(&asset("1_a_x.jpg", 1, &["Dog"])).await.unwrap();
        store.upsert(&asset("1_a_x.jpg", 1, &["Cat"])).await.unwrap();

        assert_eq!(store.len().await, 1);
        let row = store.get("1_a_x.jpg").await.unwrap().unwrap();
        assert_eq!(row.tags, vec!["Cat".to_string()]);
    }

    #[tokio::test]
    async fn scan_orders_by_created_at_then_key() {
        let store = InMemoryCatalogStore::new();
        store.upsert(&asset("3_c_c.jpg", 3, &[])).await.unwrap();
        store.upsert(&asset("1_b_b.jpg", 1, &[])).await.unwrap();
        store.upsert(&asset("1_a_a.jpg", 1, &[])).await.unwrap();

        let keys: Vec<String> = store
            .scan()
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.key)
            .collect();
        assert_eq!(keys, vec!["1_a_a.jpg", "1_b_b.jpg", "3_c_c.jpg"]);
    }

    #[tokio::test]
    async fn delete_reports_whether_a_row_existed() {
        let store = InMemoryCatalogStore::new();
        store.upsert(&asset("1_a_x.jpg", 1, &[])).await.unwrap();

        assert!(store.delete("1_a_x.jpg").await.unwrap());
        assert!(!store.delete("1_a_x.jpg").await.unwrap());
        assert!(store.get("1_a_x.jpg").await.unwrap().is_none());
        assert!(store.is_empty().await);
    }
}
