//! Mediatag Storage Library
//!
//! Object store gateway: the `Storage` trait plus S3 and local filesystem implementations.
//!
//! # Storage key format
//!
//! Every object is addressed by a flat key `{epoch_seconds}_{uuid}_{safe_name}` generated
//! once at upload time (see `keys`). The same key is the catalog's primary key, so it must never
//! be rewritten by a backend.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use keys::{key_epoch, make_key, make_key_at, safe_key_name};
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use mediatag_core::StorageBackend;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};
