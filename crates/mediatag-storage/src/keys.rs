//! Object key generation.
//!
//! Key format: `{epoch_seconds}_{uuid_v4_simple}_{safe_name}`. The UUID makes keys unique
//! even for identical names uploaded in the same second; the epoch prefix keeps a bucket
//! listing roughly chronological.
//!
//! `safe_name` is the original name with every character outside `[A-Za-z0-9._-]` replaced by
//! `-`. Object store paths, S3 URIs and URLs all carry such a key verbatim, so the backends and
//! the tagging services see the same string. The untouched name lives on the catalog row.

use uuid::Uuid;

/// Generate a key for a new upload using the current time.
pub fn make_key(original_name: &str) -> String {
    make_key_at(chrono::Utc::now().timestamp(), original_name)
}

/// Generate a key with an explicit epoch prefix.
///
/// Callers that also record a creation timestamp use this so both values agree.
pub fn make_key_at(epoch_secs: i64, original_name: &str) -> String {
    format!(
        "{}_{}_{}",
        epoch_secs,
        Uuid::new_v4().simple(),
        safe_key_name(original_name)
    )
}

/// File name reduced to key-safe characters, one output char per input char.
pub fn safe_key_name(original_name: &str) -> String {
    original_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '-'
            }
        })
        .collect()
}

/// Epoch prefix of a key produced by `make_key`.
pub fn key_epoch(key: &str) -> Option<i64> {
    key.split_once('_')?.0.parse().ok()
}
