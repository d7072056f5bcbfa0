use std::sync::Arc;

use async_trait::async_trait;
use mediatag_core::LabelSet;

use crate::backends::{JobState, VideoLabelJobService};
use crate::poller::{BackendJob, JobPoller, PollStatus};

const MAX_TOKEN_LEN: usize = 64;

/// Deterministic client request token for an object key.
///
/// Rekognition tokens allow `[A-Za-z0-9-_]` and at most 64 characters. Keys start with
/// `{epoch}_{uuid}` (43 characters), so truncation keeps distinct keys distinct.
pub fn idempotency_token(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .take(MAX_TOKEN_LEN)
        .collect()
}

struct LabelDetectionJob<'a> {
    jobs: &'a dyn VideoLabelJobService,
    bucket: &'a str,
    key: &'a str,
    min_confidence: f32,
}

#[async_trait]
impl BackendJob for LabelDetectionJob<'_> {
    // Label names arrive with the final status response.
    type Handle = Vec<String>;
    type Output = Vec<String>;

    fn kind(&self) -> &'static str {
        "video_labels"
    }

    async fn submit(&self) -> anyhow::Result<String> {
        self.jobs
            .submit(
                self.bucket,
                self.key,
                &idempotency_token(self.key),
                self.min_confidence,
            )
            .await
    }

    async fn query(&self, job_id: &str) -> anyhow::Result<PollStatus<Vec<String>>> {
        let status = self.jobs.get_status(job_id).await?;
        Ok(match status.state {
            JobState::Running => PollStatus::Running,
            JobState::Failed => PollStatus::Failed(status.status_message),
            JobState::Succeeded => PollStatus::Succeeded(status.labels),
        })
    }

    async fn fetch(&self, labels: Vec<String>) -> anyhow::Result<Vec<String>> {
        Ok(labels)
    }
}

/// Asynchronous label detection over every frame of a stored video.
#[derive(Clone)]
pub struct VideoTagger {
    jobs: Arc<dyn VideoLabelJobService>,
    poller: JobPoller,
    min_confidence: f32,
    max_tags: usize,
}

impl VideoTagger {
    pub fn new(
        jobs: Arc<dyn VideoLabelJobService>,
        poller: JobPoller,
        min_confidence: f32,
        max_tags: usize,
    ) -> Self {
        Self {
            jobs,
            poller,
            min_confidence,
            max_tags,
        }
    }

    /// Distinct label names in first-seen order, capped.
    pub async fn tag(&self, bucket: &str, key: &str) -> LabelSet {
        let job = LabelDetectionJob {
            jobs: self.jobs.as_ref(),
            bucket,
            key,
            min_confidence: self.min_confidence,
        };

        match self.poller.run(&job, key).await {
            Ok(observations) => {
                let labels = LabelSet::from_observations(&observations, self.max_tags);
                tracing::debug!(
                    key = %key,
                    observations = observations.len(),
                    distinct = labels.len(),
                    "Video labels collected"
                );
                labels
            }
            Err(e) => {
                tracing::warn!(error = %e, key = %key, "Video tagging produced no tags");
                LabelSet::empty()
            }
        }
    }
}
