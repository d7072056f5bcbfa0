//! AWS implementations of the backend interfaces.
//!
//! Rekognition labels images and videos, Transcribe turns audio into text, Comprehend extracts
//! key phrases, and transcripts are downloaded over HTTPS with `reqwest`. All clients share one
//! `SdkConfig` loaded once at startup.

mod comprehend;
mod rekognition;
mod transcribe;
mod transcript;

use std::sync::Arc;

use aws_config::BehaviorVersion;

pub use comprehend::ComprehendKeyPhrases;
pub use rekognition::{RekognitionImageLabels, RekognitionVideoLabels};
pub use transcribe::{transcription_job_name, TranscribeJobs};
pub use transcript::HttpTranscriptSource;

use crate::service::TaggingClients;

/// Load AWS configuration for `region` and build every tagging client from it.
pub async fn load_aws_clients(region: &str) -> TaggingClients {
    let config = aws_config::defaults(BehaviorVersion::latest())
        .region(aws_config::Region::new(region.to_string()))
        .load()
        .await;

    tracing::info!(region = %region, "AWS tagging clients initialized");

    TaggingClients {
        image_labels: Arc::new(RekognitionImageLabels::new(
            aws_sdk_rekognition::Client::new(&config),
        )),
        key_phrases: Arc::new(ComprehendKeyPhrases::new(aws_sdk_comprehend::Client::new(
            &config,
        ))),
        transcription: Arc::new(TranscribeJobs::new(aws_sdk_transcribe::Client::new(&config))),
        transcripts: Arc::new(HttpTranscriptSource::new(reqwest::Client::new())),
        video_labels: Arc::new(RekognitionVideoLabels::new(
            aws_sdk_rekognition::Client::new(&config),
        )),
    }
}
