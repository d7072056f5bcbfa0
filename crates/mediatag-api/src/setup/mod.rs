//! Application setup and initialization

pub mod routes;
pub mod server;

use crate::state::AppState;
use anyhow::{Context, Result};
use mediatag_core::Config;
use mediatag_services::build_library;

/// Build the media library from `config` and the router serving it.
pub async fn initialize_app(config: Config) -> Result<(AppState, axum::Router)> {
    config
        .validate()
        .context("Configuration validation failed")?;

    tracing::info!(
        environment = %config.environment(),
        storage_backend = %config.storage_backend(),
        catalog_backend = %config.catalog_backend(),
        tagging_backend = %config.tagging_backend(),
        "Configuration loaded and validated successfully"
    );

    let library = build_library(&config).await?;
    let state = AppState::new(library, config.clone());
    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
