//! Mediatag Services Layer
//!
//! The upload/tag/catalog workflow (`MediaLibrary`) and its wiring from `Config`. The API and
//! CLI crates depend on this crate only for orchestration; they stay thin.

pub mod library;

use anyhow::Context;
use mediatag_core::Config;

pub use library::{content_type_for, MediaLibrary, SearchResults};
pub use mediatag_db::{create_catalog, CatalogStore, InMemoryCatalogStore};
pub use mediatag_storage::{create_storage, Storage, StorageError};
pub use mediatag_tagging::{
    create_keyword_expander, create_tagging_service, KeywordExpander, TaggingClients,
    TaggingService,
};

/// Build storage, catalog and tagging from a validated config.
pub async fn build_library(config: &Config) -> anyhow::Result<MediaLibrary> {
    let storage = create_storage(config)
        .await
        .context("Failed to initialize object storage")?;
    let catalog = create_catalog(config)
        .await
        .context("Failed to initialize catalog")?;
    let tagging = create_tagging_service(config, storage.clone())
        .await
        .context("Failed to initialize tagging backends")?;
    let expander =
        create_keyword_expander(config).context("Failed to initialize keyword expansion")?;

    tracing::info!(
        storage_backend = %storage.backend_type(),
        bucket = %storage.bucket(),
        catalog_backend = catalog.backend_name(),
        tagging_enabled = tagging.is_enabled(),
        keyword_expansion = expander.is_some(),
        "Media library initialized"
    );

    let library = MediaLibrary::new(storage, catalog, tagging, config.presigned_url_ttl());
    Ok(match expander {
        Some(expander) => library.with_keyword_expander(expander),
        None => library,
    })
}
