use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_transcribe::types::{LanguageCode, Media, MediaFormat};
use aws_sdk_transcribe::Client as TranscribeClient;

use crate::backends::{JobState, TranscriptionJobService, TranscriptionJobStatus};

const MAX_JOB_NAME_LEN: usize = 200;

/// Transcription job name for an object key.
///
/// Transcribe accepts `[0-9a-zA-Z._-]`, at most 200 characters, and names must be unique per
/// account; object keys are unique, so the sanitized key is used directly.
pub fn transcription_job_name(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '-'
            }
        })
        .take(MAX_JOB_NAME_LEN)
        .collect()
}

#[derive(Clone)]
pub struct TranscribeJobs {
    client: TranscribeClient,
}

impl TranscribeJobs {
    pub fn new(client: TranscribeClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TranscriptionJobService for TranscribeJobs {
    async fn submit(
        &self,
        bucket: &str,
        key: &str,
        media_format: &str,
        language_code: &str,
    ) -> Result<String> {
        let job_name = transcription_job_name(key);
        let s3_uri = format!("s3://{}/{}", bucket, key);
        let media = Media::builder().media_file_uri(&s3_uri).build();

        tracing::info!(
            transcription_job_name = %job_name,
            s3_uri = %s3_uri,
            "Starting transcription job"
        );

        self.client
            .start_transcription_job()
            .transcription_job_name(&job_name)
            .media(media)
            .media_format(MediaFormat::from(media_format))
            .language_code(LanguageCode::from(language_code))
            .send()
            .await
            .context("Failed to start transcription job")?;

        Ok(job_name)
    }

    async fn get_status(&self, job_id: &str) -> Result<TranscriptionJobStatus> {
        let response = self
            .client
            .get_transcription_job()
            .transcription_job_name(job_id)
            .send()
            .await
            .context("Failed to get transcription job status")?;

        let job = response
            .transcription_job()
            .context("Transcription job not found in response")?;

        let state = match job.transcription_job_status().map(|s| s.as_str()) {
            Some("COMPLETED") => JobState::Succeeded,
            Some("FAILED") => JobState::Failed,
            // QUEUED or IN_PROGRESS
            _ => JobState::Running,
        };

        Ok(TranscriptionJobStatus {
            state,
            transcript_uri: job
                .transcript()
                .and_then(|t| t.transcript_file_uri())
                .map(String::from),
            failure_reason: job.failure_reason().map(String::from),
        })
    }
}
