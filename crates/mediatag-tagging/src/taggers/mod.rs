//! Per-strategy taggers.
//!
//! Every tagger is fail-open: backend errors, failed jobs and timeouts are logged and turn into
//! an empty tag set. None of them return `Result`.

pub mod audio;
pub mod image;
pub mod text;
pub mod video;

pub use audio::{parse_transcript, AudioTagger};
pub use image::ImageTagger;
pub use text::{truncate_chars, TextTagger};
pub use video::{idempotency_token, VideoTagger};
