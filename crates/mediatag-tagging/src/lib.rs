//! Mediatag Tagging Library
//!
//! Routes a stored object to a tagging strategy by file extension and runs it against the AI
//! backends:
//!
//! - image: synchronous label detection
//! - text: key-phrase extraction over the object's content
//! - audio: transcription job, then key phrases over the transcript
//! - video: label-detection job over every frame
//!
//! Asynchronous jobs go through `poller::JobPoller`. Tagging never fails; every error path
//! ends in an empty tag set.
//!
//! `keywords` holds the optional query expansion used by catalog search.

pub mod backends;
pub mod keywords;
pub mod poller;
pub mod router;
pub mod service;
pub mod taggers;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

pub use backends::{
    DetectedLabel, ImageLabelService, JobState, KeyPhrase, KeyPhraseService, TranscriptSource,
    TranscriptionJobService, TranscriptionJobStatus, VideoLabelJobService, VideoLabelJobStatus,
};
pub use keywords::{create_keyword_expander, parse_keyword_list, KeywordExpander};
pub use poller::{BackendJob, JobPhase, JobPoller, PollError, PollStatus, TaggingJob};
pub use router::{select_strategy, Strategy, StrategyTable};
pub use service::{create_tagging_service, TaggingClients, TaggingService};
pub use taggers::{AudioTagger, ImageTagger, TextTagger, VideoTagger};
