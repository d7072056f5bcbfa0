use serde::{Deserialize, Serialize};

use super::tags::fold_tag;

/// A catalogued media file.
///
/// `key` is assigned once at upload time and is the only identity shared by the object
/// store and the catalog. `tags` may be empty but is always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaAsset {
    pub key: String,
    pub original_name: String,
    pub extension: String,
    pub stored_url: String,
    pub tags: Vec<String>,
    /// Epoch seconds
    pub created_at: i64,
}

impl MediaAsset {
    /// Same asset with a freshly generated access URL.
    pub fn with_url(mut self, url: String) -> Self {
        self.stored_url = url;
        self
    }

    /// Case-insensitive containment over the original name and every tag.
    ///
    /// `needle` must already be lowercased.
    pub fn matches_query(&self, needle: &str) -> bool {
        self.original_name.to_lowercase().contains(needle)
            || self
                .tags
                .iter()
                .any(|tag| tag.to_lowercase().contains(needle))
    }

    /// True when any tag equals any of `keywords`, ignoring case and surrounding whitespace.
    pub fn has_any_tag(&self, keywords: &[String]) -> bool {
        self.tags.iter().map(|tag| fold_tag(tag)).any(|tag| {
            keywords
                .iter()
                .any(|keyword| !keyword.trim().is_empty() && fold_tag(keyword) == tag)
        })
    }
}

/// Lowercase extension after the last `.` of a file name, or `""` when there is none.
pub fn file_extension(file_name: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => ext.to_lowercase(),
        _ => String::new(),
    }
}

/// Final path component of a `/`- or `\`-separated path.
pub fn file_name_from_path(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}
