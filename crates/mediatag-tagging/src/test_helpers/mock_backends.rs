//! Scripted AI backends
//!
//! Every mock records what it was asked so tests can assert on call counts and arguments.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use crate::backends::{
    DetectedLabel, ImageLabelService, KeyPhrase, KeyPhraseService, TranscriptSource,
    TranscriptionJobService, TranscriptionJobStatus, VideoLabelJobService, VideoLabelJobStatus,
};
use crate::keywords::KeywordExpander;

/// Minimal Transcribe output document containing `text`.
pub fn transcript_json(text: &str) -> String {
    serde_json::json!({
        "jobName": "mock",
        "results": { "transcripts": [{ "transcript": text }], "items": [] },
        "status": "COMPLETED"
    })
    .to_string()
}

pub struct MockImageLabels {
    labels: Option<Vec<String>>,
    calls: Mutex<Vec<(String, String, i32, f32)>>,
}

impl MockImageLabels {
    pub fn returning(labels: &[&str]) -> Self {
        Self {
            labels: Some(labels.iter().map(|l| l.to_string()).collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            labels: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, String, i32, f32)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ImageLabelService for MockImageLabels {
    async fn detect_labels(
        &self,
        bucket: &str,
        key: &str,
        max_labels: i32,
        min_confidence: f32,
    ) -> Result<Vec<DetectedLabel>> {
        self.calls.lock().unwrap().push((
            bucket.to_string(),
            key.to_string(),
            max_labels,
            min_confidence,
        ));
        match &self.labels {
            Some(labels) => Ok(labels
                .iter()
                .map(|name| DetectedLabel {
                    name: name.clone(),
                    confidence: 99.0,
                })
                .collect()),
            None => anyhow::bail!("InvalidImageFormatException"),
        }
    }
}

pub struct MockKeyPhrases {
    phrases: Option<Vec<String>>,
    calls: Mutex<Vec<(String, String)>>,
}

impl MockKeyPhrases {
    pub fn returning(phrases: &[&str]) -> Self {
        Self {
            phrases: Some(phrases.iter().map(|p| p.to_string()).collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            phrases: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Texts submitted, in call order
    pub fn texts(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(text, _)| text.clone())
            .collect()
    }

    pub fn language_codes(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, code)| code.clone())
            .collect()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl KeyPhraseService for MockKeyPhrases {
    async fn detect_key_phrases(&self, text: &str, language_code: &str) -> Result<Vec<KeyPhrase>> {
        self.calls
            .lock()
            .unwrap()
            .push((text.to_string(), language_code.to_string()));
        match &self.phrases {
            Some(phrases) => Ok(phrases
                .iter()
                .map(|text| KeyPhrase {
                    text: text.clone(),
                    score: 0.99,
                })
                .collect()),
            None => anyhow::bail!("TextSizeLimitExceededException"),
        }
    }
}

/// Plays back scripted status responses, then reports Running forever.
pub struct MockTranscriptionJobs {
    reject_submission: bool,
    statuses: Mutex<VecDeque<Result<TranscriptionJobStatus>>>,
    submissions: Mutex<Vec<(String, String, String, String)>>,
    queries: AtomicU32,
}

impl MockTranscriptionJobs {
    pub fn scripted(statuses: Vec<Result<TranscriptionJobStatus>>) -> Self {
        Self {
            reject_submission: false,
            statuses: Mutex::new(statuses.into()),
            submissions: Mutex::new(Vec::new()),
            queries: AtomicU32::new(0),
        }
    }

    /// `running` in-progress responses, then completion pointing at `transcript_uri`.
    pub fn succeeding_after(running: usize, transcript_uri: &str) -> Self {
        let mut statuses: Vec<_> = (0..running)
            .map(|_| Ok(TranscriptionJobStatus::running()))
            .collect();
        statuses.push(Ok(TranscriptionJobStatus::completed(transcript_uri)));
        Self::scripted(statuses)
    }

    pub fn failing_after(running: usize, reason: &str) -> Self {
        let mut statuses: Vec<_> = (0..running)
            .map(|_| Ok(TranscriptionJobStatus::running()))
            .collect();
        statuses.push(Ok(TranscriptionJobStatus::failed(reason)));
        Self::scripted(statuses)
    }

    pub fn never_finishing() -> Self {
        Self::scripted(Vec::new())
    }

    pub fn rejecting_submission() -> Self {
        Self {
            reject_submission: true,
            ..Self::scripted(Vec::new())
        }
    }

    /// (bucket, key, media_format, language_code) per submission
    pub fn submissions(&self) -> Vec<(String, String, String, String)> {
        self.submissions.lock().unwrap().clone()
    }

    pub fn status_queries(&self) -> u32 {
        self.queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TranscriptionJobService for MockTranscriptionJobs {
    async fn submit(
        &self,
        bucket: &str,
        key: &str,
        media_format: &str,
        language_code: &str,
    ) -> Result<String> {
        if self.reject_submission {
            anyhow::bail!("LimitExceededException");
        }
        let mut submissions = self.submissions.lock().unwrap();
        submissions.push((
            bucket.to_string(),
            key.to_string(),
            media_format.to_string(),
            language_code.to_string(),
        ));
        Ok(format!("transcription-{}", submissions.len()))
    }

    async fn get_status(&self, _job_id: &str) -> Result<TranscriptionJobStatus> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(TranscriptionJobStatus::running()))
    }
}

pub struct MockTranscriptSource {
    body: Option<String>,
    fetched: Mutex<Vec<String>>,
}

impl MockTranscriptSource {
    pub fn returning(body: &str) -> Self {
        Self {
            body: Some(body.to_string()),
            fetched: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            body: None,
            fetched: Mutex::new(Vec::new()),
        }
    }

    /// URIs successfully downloaded
    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl TranscriptSource for MockTranscriptSource {
    async fn fetch_transcript(&self, uri: &str) -> Result<String> {
        match &self.body {
            Some(body) => {
                self.fetched.lock().unwrap().push(uri.to_string());
                Ok(body.clone())
            }
            None => anyhow::bail!("403 Forbidden fetching {}", uri),
        }
    }
}

/// Plays back scripted status responses, then reports Running forever.
pub struct MockVideoLabelJobs {
    statuses: Mutex<VecDeque<Result<VideoLabelJobStatus>>>,
    submissions: Mutex<Vec<(String, String, String, f32)>>,
    queries: AtomicU32,
}

impl MockVideoLabelJobs {
    pub fn scripted(statuses: Vec<Result<VideoLabelJobStatus>>) -> Self {
        Self {
            statuses: Mutex::new(statuses.into()),
            submissions: Mutex::new(Vec::new()),
            queries: AtomicU32::new(0),
        }
    }

    pub fn succeeding_with(labels: &[&str]) -> Self {
        Self::scripted(vec![Ok(VideoLabelJobStatus::succeeded(labels))])
    }

    /// (bucket, key, idempotency_token, min_confidence) per submission
    pub fn submissions(&self) -> Vec<(String, String, String, f32)> {
        self.submissions.lock().unwrap().clone()
    }

    pub fn status_queries(&self) -> u32 {
        self.queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VideoLabelJobService for MockVideoLabelJobs {
    async fn submit(
        &self,
        bucket: &str,
        key: &str,
        idempotency_token: &str,
        min_confidence: f32,
    ) -> Result<String> {
        self.submissions.lock().unwrap().push((
            bucket.to_string(),
            key.to_string(),
            idempotency_token.to_string(),
            min_confidence,
        ));
        Ok(format!("video-{}", idempotency_token))
    }

    async fn get_status(&self, _job_id: &str) -> Result<VideoLabelJobStatus> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(VideoLabelJobStatus::running()))
    }
}

/// Query expander with a fixed answer
pub struct MockKeywordExpander {
    keywords: Option<Vec<String>>,
    queries: Mutex<Vec<String>>,
}

impl MockKeywordExpander {
    pub fn returning(keywords: &[&str]) -> Self {
        Self {
            keywords: Some(keywords.iter().map(|k| k.to_string()).collect()),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            keywords: None,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl KeywordExpander for MockKeywordExpander {
    async fn expand(&self, query: &str) -> Result<Vec<String>> {
        self.queries.lock().unwrap().push(query.to_string());
        match &self.keywords {
            Some(keywords) => Ok(keywords.clone()),
            None => anyhow::bail!("Chat completions failed with status 429 Too Many Requests"),
        }
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
