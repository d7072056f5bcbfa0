//! Tagging entry point: route a stored object to its strategy and run it.

use std::sync::Arc;
use std::time::Instant;

use mediatag_core::{Config, TagSet, TaggingBackend, TaggingSettings};
use mediatag_storage::Storage;

use crate::backends::{
    ImageLabelService, KeyPhraseService, TranscriptSource, TranscriptionJobService,
    VideoLabelJobService,
};
use crate::poller::JobPoller;
use crate::router::{Strategy, StrategyTable};
use crate::taggers::{AudioTagger, ImageTagger, TextTagger, VideoTagger};

/// Backend clients the taggers talk to
#[derive(Clone)]
pub struct TaggingClients {
    pub image_labels: Arc<dyn ImageLabelService>,
    pub key_phrases: Arc<dyn KeyPhraseService>,
    pub transcription: Arc<dyn TranscriptionJobService>,
    pub transcripts: Arc<dyn TranscriptSource>,
    pub video_labels: Arc<dyn VideoLabelJobService>,
}

#[derive(Clone)]
struct Taggers {
    image: ImageTagger,
    text: TextTagger,
    audio: AudioTagger,
    video: VideoTagger,
}

#[derive(Clone)]
pub struct TaggingService {
    router: StrategyTable,
    storage: Arc<dyn Storage>,
    taggers: Option<Taggers>,
}

impl TaggingService {
    pub fn new(
        clients: TaggingClients,
        storage: Arc<dyn Storage>,
        settings: &TaggingSettings,
    ) -> Self {
        let text = TextTagger::new(
            clients.key_phrases,
            storage.clone(),
            settings.key_phrase_language_code.clone(),
            settings.text_max_chars,
            settings.max_tags,
        );

        let taggers = Taggers {
            image: ImageTagger::new(
                clients.image_labels,
                settings.image_max_labels,
                settings.image_min_confidence,
            ),
            audio: AudioTagger::new(
                clients.transcription,
                clients.transcripts,
                text.clone(),
                JobPoller::new(settings.poll_interval, settings.transcribe_max_attempts),
                settings.transcribe_language_code.clone(),
            ),
            video: VideoTagger::new(
                clients.video_labels,
                JobPoller::new(settings.poll_interval, settings.video_max_attempts),
                settings.video_min_confidence,
                settings.max_tags,
            ),
            text,
        };

        Self {
            router: StrategyTable::new(),
            storage,
            taggers: Some(taggers),
        }
    }

    /// A service that never calls a backend and always returns no tags.
    pub fn disabled(storage: Arc<dyn Storage>) -> Self {
        Self {
            router: StrategyTable::new(),
            storage,
            taggers: None,
        }
    }

    pub fn with_router(mut self, router: StrategyTable) -> Self {
        self.router = router;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.taggers.is_some()
    }

    pub fn strategy_for(&self, extension: &str) -> Option<Strategy> {
        self.router.select(extension)
    }

    /// Tag the object stored under `key`.
    ///
    /// Never fails: unknown extensions, a disabled service and backend errors all give an
    /// empty set. Asynchronous strategies block until their job finishes or times out.
    pub async fn tag(&self, key: &str, extension: &str) -> TagSet {
        let Some(strategy) = self.router.select(extension) else {
            tracing::debug!(
                key = %key,
                extension = %extension,
                "No tagging strategy for extension"
            );
            return TagSet::empty();
        };

        let Some(taggers) = &self.taggers else {
            tracing::debug!(key = %key, strategy = %strategy, "Tagging disabled");
            return TagSet::empty();
        };

        let bucket = self.storage.bucket();
        let start = Instant::now();

        let tags: TagSet = match strategy {
            Strategy::Image => taggers.image.tag(bucket, key).await.into(),
            Strategy::Text => taggers.text.tag_object(key).await.into(),
            Strategy::Audio => taggers
                .audio
                .tag(bucket, key, &extension.trim_start_matches('.').to_lowercase())
                .await
                .into(),
            Strategy::Video => taggers.video.tag(bucket, key).await.into(),
        };

        tracing::info!(
            key = %key,
            strategy = %strategy,
            tag_count = tags.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Tagging finished"
        );

        tags
    }
}

/// Build the tagging service selected by `TAGGING_BACKEND`.
pub async fn create_tagging_service(
    config: &Config,
    storage: Arc<dyn Storage>,
) -> anyhow::Result<TaggingService> {
    match config.tagging_backend() {
        TaggingBackend::Disabled => {
            tracing::warn!("Tagging disabled; uploads will be stored without tags");
            Ok(TaggingService::disabled(storage))
        }
        #[cfg(feature = "aws")]
        TaggingBackend::Aws => {
            use anyhow::Context;

            let region = config
                .aws_region()
                .context("AWS_REGION is required when TAGGING_BACKEND=aws")?;
            let clients = crate::backends::aws::load_aws_clients(region).await;
            Ok(TaggingService::new(clients, storage, config.tagging()))
        }
        #[cfg(not(feature = "aws"))]
        TaggingBackend::Aws => {
            anyhow::bail!("AWS tagging backend not available. Enable the 'aws' feature.")
        }
    }
}
