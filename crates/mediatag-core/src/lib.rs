//! Mediatag Core Library
//!
//! Domain models, error types and configuration shared by every mediatag crate.

pub mod config;
pub mod error;
pub mod models;
pub mod storage_types;

pub use config::{
    is_production_env, BaseConfig, Config, KeywordExpansionSettings, MediaTagConfig,
    TaggingSettings,
};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{fold_tag, LabelSet, MediaAsset, RankedTags, TagSet};
pub use storage_types::{CatalogBackend, StorageBackend, TaggingBackend};
