use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use mediatag_core::models::{file_extension, file_name_from_path};
use mediatag_core::{AppError, MediaAsset};
use mediatag_db::CatalogStore;
use mediatag_storage::{make_key_at, Storage};
use mediatag_tagging::{KeywordExpander, TaggingService};

/// Content type recorded on the stored object.
pub fn content_type_for(extension: &str) -> &'static str {
    match extension {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "txt" => "text/plain; charset=utf-8",
        "md" => "text/markdown; charset=utf-8",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        _ => "application/octet-stream",
    }
}

/// Outcome of a catalog search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResults {
    /// Keywords the query was expanded into; empty when expansion is off or failed
    pub keywords: Vec<String>,
    pub assets: Vec<MediaAsset>,
}

/// Upload, tag and catalog workflow over the three gateways.
///
/// One upload is one sequential unit of work: the object is stored, exactly one tagging
/// strategy runs (asynchronous jobs are polled inline), then the catalog row is written.
#[derive(Clone)]
pub struct MediaLibrary {
    storage: Arc<dyn Storage>,
    catalog: Arc<dyn CatalogStore>,
    tagging: TaggingService,
    presign_ttl: Duration,
    expander: Option<Arc<dyn KeywordExpander>>,
}

impl MediaLibrary {
    pub fn new(
        storage: Arc<dyn Storage>,
        catalog: Arc<dyn CatalogStore>,
        tagging: TaggingService,
        presign_ttl: Duration,
    ) -> Self {
        Self {
            storage,
            catalog,
            tagging,
            presign_ttl,
            expander: None,
        }
    }

    /// Also match whole tags against keywords derived from the query.
    pub fn with_keyword_expander(mut self, expander: Arc<dyn KeywordExpander>) -> Self {
        self.expander = Some(expander);
        self
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    pub fn catalog(&self) -> &Arc<dyn CatalogStore> {
        &self.catalog
    }

    /// Upload a local file. Its file name becomes the asset's original name.
    #[tracing::instrument(skip(self, path), fields(path = %path.display()))]
    pub async fn upload_and_tag(&self, path: &Path) -> Result<MediaAsset, AppError> {
        let data = tokio::fs::read(path).await.map_err(|e| {
            AppError::InvalidInput(format!("Cannot read {}: {}", path.display(), e))
        })?;

        let original_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| {
                AppError::InvalidInput(format!("{} has no file name", path.display()))
            })?;

        self.upload_bytes(&original_name, data).await
    }

    /// Store `data`, tag it and write the catalog row.
    ///
    /// Only the initial put is fatal. Tagging never fails, and a catalog write failure is
    /// logged while the asset is still returned.
    #[tracing::instrument(skip(self, data), fields(size_bytes = data.len()))]
    pub async fn upload_bytes(
        &self,
        original_name: &str,
        data: Vec<u8>,
    ) -> Result<MediaAsset, AppError> {
        let original_name = file_name_from_path(original_name.trim());
        if original_name.is_empty() {
            return Err(AppError::InvalidInput("File name is required".to_string()));
        }

        let extension = file_extension(original_name);
        let created_at = Utc::now().timestamp();
        let key = make_key_at(created_at, original_name);

        self.storage
            .put(&key, data, content_type_for(&extension))
            .await
            .map_err(|e| AppError::Storage(format!("Failed to store {}: {}", key, e)))?;

        let tags = self.tagging.tag(&key, &extension).await.into_vec();
        let stored_url = self.access_url(&key).await;

        let asset = MediaAsset {
            key,
            original_name: original_name.to_string(),
            extension,
            stored_url,
            tags,
            created_at,
        };

        if let Err(e) = self.catalog.upsert(&asset).await {
            tracing::error!(
                error = %e,
                key = %asset.key,
                "Catalog write failed; object is stored but not catalogued"
            );
        } else {
            tracing::info!(
                key = %asset.key,
                extension = %asset.extension,
                tag_count = asset.tags.len(),
                "Asset catalogued"
            );
        }

        Ok(asset)
    }

    /// Every catalogued asset, oldest first, with fresh access URLs.
    #[tracing::instrument(skip(self))]
    pub async fn list_catalog(&self) -> Result<Vec<MediaAsset>, AppError> {
        let assets = self.catalog.scan().await?;
        Ok(self.refresh_urls(assets).await)
    }

    /// Assets whose original name or any tag contains `query`, ignoring case.
    pub async fn search_catalog(&self, query: &str) -> Result<Vec<MediaAsset>, AppError> {
        Ok(self.search_catalog_detailed(query).await?.assets)
    }

    /// Substring search, widened by keyword expansion when an expander is configured.
    ///
    /// An asset matches if its name or a tag contains the query, or if one of its tags equals
    /// an expanded keyword (ignoring case). Catalog order is kept. Expansion failures are
    /// logged and leave the substring result.
    #[tracing::instrument(skip(self))]
    pub async fn search_catalog_detailed(&self, query: &str) -> Result<SearchResults, AppError> {
        let needle = query.trim().to_lowercase();
        let keywords = self.expand_query(query).await;

        let matches = self
            .catalog
            .scan()
            .await?
            .into_iter()
            .filter(|asset| asset.matches_query(&needle) || asset.has_any_tag(&keywords))
            .collect();

        Ok(SearchResults {
            keywords,
            assets: self.refresh_urls(matches).await,
        })
    }

    async fn expand_query(&self, query: &str) -> Vec<String> {
        let Some(expander) = &self.expander else {
            return Vec::new();
        };
        if query.trim().is_empty() {
            return Vec::new();
        }

        match expander.expand(query).await {
            Ok(keywords) => {
                tracing::debug!(
                    expander = expander.name(),
                    keywords = ?keywords,
                    "Query expanded"
                );
                keywords
            }
            Err(e) => {
                tracing::warn!(
                    expander = expander.name(),
                    error = %e,
                    "Keyword expansion failed; using substring search only"
                );
                Vec::new()
            }
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_asset(&self, key: &str) -> Result<Option<MediaAsset>, AppError> {
        match self.catalog.get(key).await? {
            Some(asset) => {
                let url = self.access_url(&asset.key).await;
                Ok(Some(asset.with_url(url)))
            }
            None => Ok(None),
        }
    }

    /// Remove the object and its catalog row.
    ///
    /// Both halves are always attempted; `false` if either failed. Nothing is rolled back.
    #[tracing::instrument(skip(self))]
    pub async fn delete_asset(&self, key: &str) -> bool {
        let object_deleted = match self.storage.delete(key).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(error = %e, key = %key, "Failed to delete object");
                false
            }
        };

        let row_deleted = match self.catalog.delete(key).await {
            Ok(existed) => {
                if !existed {
                    tracing::debug!(key = %key, "No catalog row to delete");
                }
                true
            }
            Err(e) => {
                tracing::error!(error = %e, key = %key, "Failed to delete catalog row");
                false
            }
        };

        object_deleted && row_deleted
    }

    async fn refresh_urls(&self, assets: Vec<MediaAsset>) -> Vec<MediaAsset> {
        let mut refreshed = Vec::with_capacity(assets.len());
        for asset in assets {
            let url = self.access_url(&asset.key).await;
            refreshed.push(asset.with_url(url));
        }
        refreshed
    }

    /// Presigned URL, or the unsigned object URL when presigning fails.
    async fn access_url(&self, key: &str) -> String {
        match self.storage.presigned_get_url(key, self.presign_ttl).await {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(error = %e, key = %key, "Presigning failed; using object URL");
                self.storage.object_url(key)
            }
        }
    }
}
