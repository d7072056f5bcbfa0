use std::sync::Arc;

use mediatag_core::RankedTags;

use crate::backends::ImageLabelService;

/// One synchronous label-detection call per image.
#[derive(Clone)]
pub struct ImageTagger {
    labels: Arc<dyn ImageLabelService>,
    max_labels: i32,
    min_confidence: f32,
}

impl ImageTagger {
    pub fn new(labels: Arc<dyn ImageLabelService>, max_labels: i32, min_confidence: f32) -> Self {
        Self {
            labels,
            max_labels,
            min_confidence,
        }
    }

    /// Label names in the backend's order. Empty when the backend call fails.
    pub async fn tag(&self, bucket: &str, key: &str) -> RankedTags {
        match self
            .labels
            .detect_labels(bucket, key, self.max_labels, self.min_confidence)
            .await
        {
            Ok(labels) => RankedTags::from_ranked(
                labels.iter().map(|label| label.name.as_str()),
                self.max_labels.max(0) as usize,
            ),
            Err(e) => {
                tracing::warn!(
                    error = %format!("{:#}", e),
                    key = %key,
                    "Image label detection failed"
                );
                RankedTags::empty()
            }
        }
    }
}
