use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_rekognition::types::{Image, S3Object, Video};
use aws_sdk_rekognition::Client as RekognitionClient;

use crate::backends::{
    DetectedLabel, ImageLabelService, JobState, VideoLabelJobService, VideoLabelJobStatus,
};

fn s3_object(bucket: &str, key: &str) -> S3Object {
    S3Object::builder().bucket(bucket).name(key).build()
}

/// DetectLabels on an S3 object
#[derive(Clone)]
pub struct RekognitionImageLabels {
    client: RekognitionClient,
}

impl RekognitionImageLabels {
    pub fn new(client: RekognitionClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ImageLabelService for RekognitionImageLabels {
    async fn detect_labels(
        &self,
        bucket: &str,
        key: &str,
        max_labels: i32,
        min_confidence: f32,
    ) -> Result<Vec<DetectedLabel>> {
        let image = Image::builder().s3_object(s3_object(bucket, key)).build();

        let response = self
            .client
            .detect_labels()
            .image(image)
            .max_labels(max_labels)
            .min_confidence(min_confidence)
            .send()
            .await
            .context("Failed to detect labels")?;

        Ok(response
            .labels()
            .iter()
            .filter_map(|label| {
                Some(DetectedLabel {
                    name: label.name()?.to_string(),
                    confidence: label.confidence().unwrap_or(0.0),
                })
            })
            .collect())
    }
}

/// StartLabelDetection / GetLabelDetection for stored videos
#[derive(Clone)]
pub struct RekognitionVideoLabels {
    client: RekognitionClient,
}

impl RekognitionVideoLabels {
    pub fn new(client: RekognitionClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl VideoLabelJobService for RekognitionVideoLabels {
    async fn submit(
        &self,
        bucket: &str,
        key: &str,
        idempotency_token: &str,
        min_confidence: f32,
    ) -> Result<String> {
        let video = Video::builder().s3_object(s3_object(bucket, key)).build();

        let response = self
            .client
            .start_label_detection()
            .video(video)
            .client_request_token(idempotency_token)
            .min_confidence(min_confidence)
            .send()
            .await
            .context("Failed to start label detection")?;

        response
            .job_id()
            .map(String::from)
            .context("StartLabelDetection returned no job id")
    }

    async fn get_status(&self, job_id: &str) -> Result<VideoLabelJobStatus> {
        let mut labels = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let response = self
                .client
                .get_label_detection()
                .job_id(job_id)
                .set_next_token(next_token.take())
                .max_results(1000)
                .send()
                .await
                .context("Failed to get label detection status")?;

            let state = match response.job_status().map(|s| s.as_str()) {
                Some("SUCCEEDED") => JobState::Succeeded,
                Some("FAILED") => JobState::Failed,
                // IN_PROGRESS, or a status this SDK version does not know yet
                _ => JobState::Running,
            };

            if state != JobState::Succeeded {
                return Ok(VideoLabelJobStatus {
                    state,
                    labels: Vec::new(),
                    status_message: response.status_message().map(String::from),
                });
            }

            labels.extend(
                response
                    .labels()
                    .iter()
                    .filter_map(|detection| detection.label().and_then(|l| l.name()))
                    .map(String::from),
            );

            match response.next_token() {
                Some(token) if !token.is_empty() => next_token = Some(token.to_string()),
                _ => {
                    return Ok(VideoLabelJobStatus {
                        state,
                        labels,
                        status_message: response.status_message().map(String::from),
                    })
                }
            }
        }
    }
}
