//! Natural-language search expansion.
//!
//! A `KeywordExpander` turns a query such as "an audio that mentioned electronics" into the
//! keywords and synonyms a catalog entry might be tagged with. Callers match the result against
//! whole tags and keep the plain substring search as the floor, so an unavailable expander only
//! costs recall.

use std::sync::Arc;

use async_trait::async_trait;
use mediatag_core::{Config, RankedTags};

/// Upper bound on keywords taken from one expansion
pub const MAX_QUERY_KEYWORDS: usize = 50;

#[async_trait]
pub trait KeywordExpander: Send + Sync {
    /// Keywords (with synonyms) for `query`, most relevant first.
    async fn expand(&self, query: &str) -> anyhow::Result<Vec<String>>;

    fn name(&self) -> &'static str;
}

/// Instructions sent with every query.
pub const EXPANSION_SYSTEM_PROMPT: &str = "You are a text analysis assistant. \
Extract the most important keywords from the user's search request: topics, people, \
organizations, places, events and technical terms. After each keyword add the synonyms and \
closely related words a media library might use as a tag. Reply with one comma-separated \
list and nothing else: no numbering, no explanations. Prefer short canonical names.";

pub fn expansion_user_prompt(query: &str) -> String {
    format!("Search request:\n<<<\n{}\n>>>", query.trim())
}

/// Split a comma- or newline-separated model reply into normalized keywords.
///
/// Bullets, numbering and quotes the model adds despite the instructions are stripped.
/// Duplicates collapse case-insensitively and the result is capped at `MAX_QUERY_KEYWORDS`.
pub fn parse_keyword_list(reply: &str) -> Vec<String> {
    let cleaned = reply.split([',', '\n', ';']).map(|item| {
        strip_list_marker(item)
            .trim_matches(['"', '\'', '`'])
            .trim()
            .to_string()
    });

    RankedTags::from_ranked(cleaned, MAX_QUERY_KEYWORDS).into_vec()
}

/// Drop a leading bullet (`-`, `*`, `•`) or ordinal (`1.`, `2)`) from a list item.
fn strip_list_marker(item: &str) -> &str {
    let item = item.trim().trim_start_matches(['-', '*', '•']).trim_start();

    let digits = item.len() - item.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits > 0 {
        let rest = &item[digits..];
        if let Some(after) = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')')) {
            if after.is_empty() || after.starts_with(char::is_whitespace) {
                return after.trim();
            }
        }
    }
    item.trim()
}

/// Expander configured by `LLM_API_KEY`, or `None` when keyword expansion is off.
pub fn create_keyword_expander(
    config: &Config,
) -> anyhow::Result<Option<Arc<dyn KeywordExpander>>> {
    let Some(settings) = config.keyword_expansion() else {
        tracing::debug!("Keyword expansion disabled; search uses substring matching only");
        return Ok(None);
    };

    #[cfg(feature = "llm")]
    {
        let expander = crate::backends::llm::ChatCompletionsExpander::new(settings.clone())?;
        tracing::info!(
            api_url = %settings.api_url,
            model = %settings.model,
            "Keyword expansion enabled"
        );
        Ok(Some(Arc::new(expander)))
    }

    #[cfg(not(feature = "llm"))]
    {
        let _ = settings;
        anyhow::bail!("LLM_API_KEY is set but the 'llm' feature is not enabled")
    }
}
