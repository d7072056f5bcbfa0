//! Test helpers for tagging and library tests
//!
//! Mock backends and an in-memory `Storage`, so the full upload/tag flow runs without AWS.

pub mod mock_backends;
pub mod mock_storage;

pub use mock_backends::*;
pub use mock_storage::*;

use std::sync::Arc;

use crate::service::TaggingClients;

/// One mock per backend, kept around so tests can inspect them after wiring a service.
pub struct MockClients {
    pub image_labels: Arc<MockImageLabels>,
    pub key_phrases: Arc<MockKeyPhrases>,
    pub transcription: Arc<MockTranscriptionJobs>,
    pub transcripts: Arc<MockTranscriptSource>,
    pub video_labels: Arc<MockVideoLabelJobs>,
}

impl MockClients {
    /// Every backend succeeds immediately with a small fixed result.
    pub fn succeeding() -> Self {
        Self {
            image_labels: Arc::new(MockImageLabels::returning(&["Dog", "Animal", "Pet"])),
            key_phrases: Arc::new(MockKeyPhrases::returning(&["Paris", "France"])),
            transcription: Arc::new(MockTranscriptionJobs::succeeding_after(
                1,
                "https://transcripts.mock/job.json",
            )),
            transcripts: Arc::new(MockTranscriptSource::returning(&transcript_json(
                "We are going to Paris in France",
            ))),
            video_labels: Arc::new(MockVideoLabelJobs::succeeding_with(&["Car", "car", "Road"])),
        }
    }

    /// Every backend call fails.
    pub fn failing() -> Self {
        Self {
            image_labels: Arc::new(MockImageLabels::failing()),
            key_phrases: Arc::new(MockKeyPhrases::failing()),
            transcription: Arc::new(MockTranscriptionJobs::rejecting_submission()),
            transcripts: Arc::new(MockTranscriptSource::failing()),
            video_labels: Arc::new(MockVideoLabelJobs::scripted(vec![Err(anyhow::anyhow!(
                "AccessDeniedException"
            ))])),
        }
    }

    pub fn clients(&self) -> TaggingClients {
        TaggingClients {
            image_labels: self.image_labels.clone(),
            key_phrases: self.key_phrases.clone(),
            transcription: self.transcription.clone(),
            transcripts: self.transcripts.clone(),
            video_labels: self.video_labels.clone(),
        }
    }

    /// Backend calls across all services, counting submissions and status queries.
    pub fn total_calls(&self) -> usize {
        self.image_labels.call_count()
            + self.key_phrases.call_count()
            + self.transcription.submissions().len()
            + self.transcription.status_queries() as usize
            + self.transcripts.fetched().len()
            + self.video_labels.submissions().len()
            + self.video_labels.status_queries() as usize
    }
}
