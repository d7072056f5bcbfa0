use std::sync::Arc;

use mediatag_core::RankedTags;
use mediatag_storage::Storage;

use crate::backends::KeyPhraseService;

/// Key-phrase extraction over text content, shared by the text and audio strategies.
#[derive(Clone)]
pub struct TextTagger {
    phrases: Arc<dyn KeyPhraseService>,
    storage: Arc<dyn Storage>,
    language_code: String,
    max_chars: usize,
    max_tags: usize,
}

impl TextTagger {
    pub fn new(
        phrases: Arc<dyn KeyPhraseService>,
        storage: Arc<dyn Storage>,
        language_code: String,
        max_chars: usize,
        max_tags: usize,
    ) -> Self {
        Self {
            phrases,
            storage,
            language_code,
            max_chars,
            max_tags,
        }
    }

    /// Read the object back from storage and tag its content.
    pub async fn tag_object(&self, key: &str) -> RankedTags {
        let bytes = match self.storage.get(key).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(error = %e, key = %key, "Failed to read text object for tagging");
                return RankedTags::empty();
            }
        };

        let text = String::from_utf8_lossy(&bytes);
        self.tag_text(&text, key).await
    }

    /// Tag raw text. `source` only labels log lines.
    pub async fn tag_text(&self, text: &str, source: &str) -> RankedTags {
        let text = truncate_chars(text, self.max_chars);
        if text.trim().is_empty() {
            tracing::debug!(key = %source, "No text to extract key phrases from");
            return RankedTags::empty();
        }

        match self
            .phrases
            .detect_key_phrases(text, &self.language_code)
            .await
        {
            Ok(phrases) => RankedTags::from_ranked(
                phrases.iter().map(|phrase| phrase.text.as_str()),
                self.max_tags,
            ),
            Err(e) => {
                tracing::warn!(
                    error = %format!("{:#}", e),
                    key = %source,
                    "Key phrase extraction failed"
                );
                RankedTags::empty()
            }
        }
    }
}

/// Longest prefix of `text` with at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}
