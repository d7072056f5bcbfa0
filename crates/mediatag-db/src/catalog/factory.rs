use std::sync::Arc;

use mediatag_core::{AppError, CatalogBackend, Config};

use super::{CatalogStore, InMemoryCatalogStore, PgCatalogStore};
use crate::pool::setup_database;

/// Create the catalog backend selected by `CATALOG_BACKEND`.
///
/// The postgres backend connects and applies pending migrations before returning.
pub async fn create_catalog(config: &Config) -> Result<Arc<dyn CatalogStore>, AppError> {
    match config.catalog_backend() {
        CatalogBackend::Postgres => {
            tracing::info!("Initializing PostgreSQL catalog");
            let pool = setup_database(config).await?;
            Ok(Arc::new(PgCatalogStore::new(pool)))
        }
        CatalogBackend::Memory => {
            tracing::warn!("Using in-memory catalog; contents are lost on restart");
            Ok(Arc::new(InMemoryCatalogStore::new()))
        }
    }
}
