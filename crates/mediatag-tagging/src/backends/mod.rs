//! AI backend interfaces consumed by the taggers.
//!
//! Every call returns `anyhow::Result`; the taggers decide what a failure means (always: no
//! tags). Implementations for AWS live in `aws` behind the `aws` feature; the
//! search-side keyword expander lives in `llm`.

#[cfg(feature = "aws")]
pub mod aws;
#[cfg(feature = "llm")]
pub mod llm;

use anyhow::Result;
use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq)]
pub struct DetectedLabel {
    pub name: String,
    pub confidence: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeyPhrase {
    pub text: String,
    pub score: f32,
}

/// Backend-reported state of an asynchronous job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    /// Queued or in progress
    Running,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptionJobStatus {
    pub state: JobState,
    /// Where the transcript JSON can be downloaded once the job succeeded
    pub transcript_uri: Option<String>,
    pub failure_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VideoLabelJobStatus {
    pub state: JobState,
    /// Label names over every frame observation and every result page. Empty until the job
    /// succeeded.
    pub labels: Vec<String>,
    pub status_message: Option<String>,
}

impl TranscriptionJobStatus {
    pub fn running() -> Self {
        Self {
            state: JobState::Running,
            transcript_uri: None,
            failure_reason: None,
        }
    }

    pub fn completed(transcript_uri: &str) -> Self {
        Self {
            state: JobState::Succeeded,
            transcript_uri: Some(transcript_uri.to_string()),
            failure_reason: None,
        }
    }

    pub fn failed(reason: &str) -> Self {
        Self {
            state: JobState::Failed,
            transcript_uri: None,
            failure_reason: Some(reason.to_string()),
        }
    }
}

impl VideoLabelJobStatus {
    pub fn running() -> Self {
        Self {
            state: JobState::Running,
            labels: Vec::new(),
            status_message: None,
        }
    }

    pub fn succeeded(labels: &[&str]) -> Self {
        Self {
            state: JobState::Succeeded,
            labels: labels.iter().map(|l| l.to_string()).collect(),
            status_message: None,
        }
    }

    pub fn failed(message: &str) -> Self {
        Self {
            state: JobState::Failed,
            labels: Vec::new(),
            status_message: Some(message.to_string()),
        }
    }
}

/// Synchronous label detection on an image already in the bucket
#[async_trait]
pub trait ImageLabelService: Send + Sync {
    async fn detect_labels(
        &self,
        bucket: &str,
        key: &str,
        max_labels: i32,
        min_confidence: f32,
    ) -> Result<Vec<DetectedLabel>>;
}

#[async_trait]
pub trait KeyPhraseService: Send + Sync {
    async fn detect_key_phrases(&self, text: &str, language_code: &str) -> Result<Vec<KeyPhrase>>;
}

#[async_trait]
pub trait TranscriptionJobService: Send + Sync {
    /// Start a job for `s3://{bucket}/{key}` and return its backend id.
    async fn submit(
        &self,
        bucket: &str,
        key: &str,
        media_format: &str,
        language_code: &str,
    ) -> Result<String>;

    async fn get_status(&self, job_id: &str) -> Result<TranscriptionJobStatus>;
}

/// Downloads the raw transcript document a finished transcription job points at.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    async fn fetch_transcript(&self, uri: &str) -> Result<String>;
}

#[async_trait]
pub trait VideoLabelJobService: Send + Sync {
    /// Start label detection. Submitting twice with the same `idempotency_token` must not
    /// start a second job.
    async fn submit(
        &self,
        bucket: &str,
        key: &str,
        idempotency_token: &str,
        min_confidence: f32,
    ) -> Result<String>;

    async fn get_status(&self, job_id: &str) -> Result<VideoLabelJobStatus>;
}
