use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::backends::TranscriptSource;

/// Downloads transcript documents from the presigned HTTPS URI Transcribe reports.
#[derive(Clone)]
pub struct HttpTranscriptSource {
    client: reqwest::Client,
}

impl HttpTranscriptSource {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TranscriptSource for HttpTranscriptSource {
    async fn fetch_transcript(&self, uri: &str) -> Result<String> {
        let response = self
            .client
            .get(uri)
            .send()
            .await
            .context("Failed to download transcript")?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!(
                "Failed to download transcript: HTTP {}",
                response.status()
            ));
        }

        response
            .text()
            .await
            .context("Failed to read transcript body")
    }
}
