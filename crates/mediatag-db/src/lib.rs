//! Catalog repositories for the data access layer.

pub mod catalog;
pub mod pool;

pub use catalog::{create_catalog, CatalogStore, InMemoryCatalogStore, PgCatalogStore};
pub use pool::setup_database;
