use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_comprehend::types::LanguageCode;
use aws_sdk_comprehend::Client as ComprehendClient;

use crate::backends::{KeyPhrase, KeyPhraseService};

#[derive(Clone)]
pub struct ComprehendKeyPhrases {
    client: ComprehendClient,
}

impl ComprehendKeyPhrases {
    pub fn new(client: ComprehendClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl KeyPhraseService for ComprehendKeyPhrases {
    async fn detect_key_phrases(&self, text: &str, language_code: &str) -> Result<Vec<KeyPhrase>> {
        let response = self
            .client
            .detect_key_phrases()
            .text(text)
            .language_code(LanguageCode::from(language_code))
            .send()
            .await
            .context("Failed to detect key phrases")?;

        Ok(response
            .key_phrases()
            .iter()
            .filter_map(|phrase| {
                Some(KeyPhrase {
                    text: phrase.text()?.to_string(),
                    score: phrase.score().unwrap_or(0.0),
                })
            })
            .collect())
    }
}
