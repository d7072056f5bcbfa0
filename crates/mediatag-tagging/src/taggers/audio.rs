use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use mediatag_core::RankedTags;
use serde::Deserialize;

use crate::backends::{JobState, TranscriptSource, TranscriptionJobService};
use crate::poller::{BackendJob, JobPoller, PollStatus};
use crate::taggers::TextTagger;

// Transcribe output document; only the fields used here.
#[derive(Debug, Deserialize)]
struct TranscriptDocument {
    results: TranscriptResults,
}

#[derive(Debug, Deserialize)]
struct TranscriptResults {
    transcripts: Vec<Transcript>,
}

#[derive(Debug, Deserialize)]
struct Transcript {
    transcript: Option<String>,
}

/// Extract `results.transcripts[0].transcript` from a transcript document.
pub fn parse_transcript(body: &str) -> anyhow::Result<String> {
    let document: TranscriptDocument =
        serde_json::from_str(body).context("Failed to parse transcript JSON")?;

    document
        .results
        .transcripts
        .into_iter()
        .next()
        .context("Transcript document has no transcripts")
        .map(|t| t.transcript.unwrap_or_default())
}

struct TranscriptionJob<'a> {
    jobs: &'a dyn TranscriptionJobService,
    transcripts: &'a dyn TranscriptSource,
    bucket: &'a str,
    key: &'a str,
    media_format: &'a str,
    language_code: &'a str,
}

#[async_trait]
impl BackendJob for TranscriptionJob<'_> {
    type Handle = String;
    type Output = String;

    fn kind(&self) -> &'static str {
        "transcription"
    }

    async fn submit(&self) -> anyhow::Result<String> {
        self.jobs
            .submit(self.bucket, self.key, self.media_format, self.language_code)
            .await
    }

    async fn query(&self, job_id: &str) -> anyhow::Result<PollStatus<String>> {
        let status = self.jobs.get_status(job_id).await?;
        Ok(match status.state {
            JobState::Running => PollStatus::Running,
            JobState::Failed => PollStatus::Failed(status.failure_reason),
            JobState::Succeeded => PollStatus::Succeeded(
                status
                    .transcript_uri
                    .context("Completed transcription job reported no transcript URI")?,
            ),
        })
    }

    async fn fetch(&self, transcript_uri: String) -> anyhow::Result<String> {
        let body = self.transcripts.fetch_transcript(&transcript_uri).await?;
        parse_transcript(&body)
    }

    fn result_locator(transcript_uri: &String) -> Option<String> {
        Some(transcript_uri.clone())
    }
}

/// Transcribe, then run the transcript through the key-phrase step.
#[derive(Clone)]
pub struct AudioTagger {
    jobs: Arc<dyn TranscriptionJobService>,
    transcripts: Arc<dyn TranscriptSource>,
    text: TextTagger,
    poller: JobPoller,
    language_code: String,
}

impl AudioTagger {
    pub fn new(
        jobs: Arc<dyn TranscriptionJobService>,
        transcripts: Arc<dyn TranscriptSource>,
        text: TextTagger,
        poller: JobPoller,
        language_code: String,
    ) -> Self {
        Self {
            jobs,
            transcripts,
            text,
            poller,
            language_code,
        }
    }

    /// `extension` doubles as the media format ("mp3", "wav").
    pub async fn tag(&self, bucket: &str, key: &str, extension: &str) -> RankedTags {
        let job = TranscriptionJob {
            jobs: self.jobs.as_ref(),
            transcripts: self.transcripts.as_ref(),
            bucket,
            key,
            media_format: extension,
            language_code: &self.language_code,
        };

        match self.poller.run(&job, key).await {
            Ok(transcript) => self.text.tag_text(&transcript, key).await,
            Err(e) => {
                tracing::warn!(error = %e, key = %key, "Audio tagging produced no tags");
                RankedTags::empty()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{
        transcript_json, MockKeyPhrases, MockStorage, MockTranscriptSource, MockTranscriptionJobs,
    };
    use std::time::Duration;

    fn tagger(
        jobs: Arc<MockTranscriptionJobs>,
        source: Arc<MockTranscriptSource>,
        phrases: Arc<MockKeyPhrases>,
    ) -> AudioTagger {
        let storage = Arc::new(MockStorage::new());
        let text = TextTagger::new(phrases, storage, "en".to_string(), 5000, 10);
        AudioTagger::new(
            jobs,
            source,
            text,
            JobPoller::new(Duration::from_secs(1), 60),
            "en-US".to_string(),
        )
    }

    #[test]
    fn parses_first_transcript() {
        let body = transcript_json("hello world");
        assert_eq!(parse_transcript(&body).unwrap(), "hello world");
        assert!(parse_transcript(r#"{"results":{"transcripts":[]}}"#).is_err());
        assert!(parse_transcript("not json").is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn transcript_goes_through_key_phrases() {
        let jobs = Arc::new(MockTranscriptionJobs::succeeding_after(2, "https://out/t.json"));
        let source = Arc::new(MockTranscriptSource::returning(&transcript_json(
            "Welcome to the quarterly earnings call",
        )));
        let phrases = Arc::new(MockKeyPhrases::returning(&["quarterly earnings call"]));

        let tags = tagger(jobs.clone(), source.clone(), phrases.clone())
            .tag("media", "1_a_talk.mp3", "mp3")
            .await;

        assert_eq!(tags.into_vec(), vec!["quarterly earnings call"]);
        assert_eq!(jobs.status_queries(), 3);
        assert_eq!(
            jobs.submissions(),
            vec![(
                "media".to_string(),
                "1_a_talk.mp3".to_string(),
                "mp3".to_string(),
                "en-US".to_string()
            )]
        );
        assert_eq!(source.fetched(), vec!["https://out/t.json".to_string()]);
        assert_eq!(
            phrases.texts(),
            vec!["Welcome to the quarterly earnings call".to_string()]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn job_failure_after_59_running_polls_yields_no_tags() {
        let jobs = Arc::new(MockTranscriptionJobs::failing_after(59, "bad audio"));
        let source = Arc::new(MockTranscriptSource::returning(&transcript_json("x")));
        let phrases = Arc::new(MockKeyPhrases::returning(&["x"]));

        let tags = tagger(jobs.clone(), source.clone(), phrases.clone())
            .tag("media", "k.mp3", "mp3")
            .await;

        assert!(tags.is_empty());
        assert_eq!(jobs.status_queries(), 60);
        assert!(source.fetched().is_empty());
        assert!(phrases.texts().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_yields_no_tags() {
        let jobs = Arc::new(MockTranscriptionJobs::never_finishing());
        let phrases = Arc::new(MockKeyPhrases::returning(&["x"]));

        let tags = tagger(
            jobs.clone(),
            Arc::new(MockTranscriptSource::failing()),
            phrases,
        )
        .tag("media", "k.wav", "wav")
        .await;

        assert!(tags.is_empty());
        assert_eq!(jobs.status_queries(), 60);
    }

    #[tokio::test(start_paused = true)]
    async fn submission_or_download_failure_yields_no_tags() {
        let phrases = Arc::new(MockKeyPhrases::returning(&["x"]));

        let rejected = Arc::new(MockTranscriptionJobs::rejecting_submission());
        let tags = tagger(
            rejected.clone(),
            Arc::new(MockTranscriptSource::returning("{}")),
            phrases.clone(),
        )
        .tag("media", "k.mp3", "mp3")
        .await;
        assert!(tags.is_empty());
        assert_eq!(rejected.status_queries(), 0);

        let jobs = Arc::new(MockTranscriptionJobs::succeeding_after(0, "https://out/t.json"));
        let tags = tagger(jobs, Arc::new(MockTranscriptSource::failing()), phrases.clone())
            .tag("media", "k.mp3", "mp3")
            .await;
        assert!(tags.is_empty());
        assert!(phrases.texts().is_empty());
    }
}
