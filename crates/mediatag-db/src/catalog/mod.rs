//! Catalog persistence
//!
//! One row per uploaded object, keyed by the object key. The catalog never talks to the object
//! store; keeping the two in step is the caller's job.

pub mod factory;
pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use mediatag_core::{AppError, MediaAsset};

pub use factory::create_catalog;
pub use memory::InMemoryCatalogStore;
pub use postgres::PgCatalogStore;

/// Trait for catalog operations
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Insert the asset, or replace every field of the existing row with the same key.
    async fn upsert(&self, asset: &MediaAsset) -> Result<(), AppError>;

    async fn get(&self, key: &str) -> Result<Option<MediaAsset>, AppError>;

    /// Every row, oldest first (ties broken by key).
    async fn scan(&self) -> Result<Vec<MediaAsset>, AppError>;

    /// Returns whether a row was removed. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<bool, AppError>;

    fn backend_name(&self) -> &'static str;
}
