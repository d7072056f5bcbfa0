//! OpenAI-compatible chat-completions keyword expander.
//!
//! Works against any server that speaks `POST {api_url}/chat/completions` with bearer auth.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use mediatag_core::KeywordExpansionSettings;
use serde::{Deserialize, Serialize};

use crate::keywords::{
    expansion_user_prompt, parse_keyword_list, KeywordExpander, EXPANSION_SYSTEM_PROMPT,
};

const TEMPERATURE: f32 = 0.7;

#[derive(Clone)]
pub struct ChatCompletionsExpander {
    settings: KeywordExpansionSettings,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

impl ChatCompletionsExpander {
    pub fn new(settings: KeywordExpansionSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .context("Failed to create HTTP client for keyword expansion")?;
        Ok(Self { settings, client })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.settings.api_url.trim_end_matches('/'))
    }

    fn request_for(&self, query: &str) -> ChatRequest {
        ChatRequest {
            model: self.settings.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: EXPANSION_SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: expansion_user_prompt(query),
                },
            ],
            temperature: TEMPERATURE,
            stream: false,
        }
    }
}

/// Text of the first choice, or an empty string when the model said nothing.
fn reply_text(response: ChatResponse) -> String {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .unwrap_or_default()
}

#[async_trait]
impl KeywordExpander for ChatCompletionsExpander {
    async fn expand(&self, query: &str) -> Result<Vec<String>> {
        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.settings.api_key)
            .json(&self.request_for(query))
            .send()
            .await
            .context("Failed to send chat completions request")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow!(
                "Chat completions failed with status {}: {}",
                status,
                error_text
            ));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .context("Failed to parse chat completions response")?;

        let keywords = parse_keyword_list(&reply_text(parsed));
        tracing::debug!(count = keywords.len(), "Query expanded into keywords");
        Ok(keywords)
    }

    fn name(&self) -> &'static str {
        "chat-completions"
    }
}
