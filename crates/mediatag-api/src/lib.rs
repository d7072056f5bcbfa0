//! Mediatag API Library
//!
//! HTTP surface over `MediaLibrary`: upload, list, get, search and delete.

pub mod constants;
pub mod error;
mod handlers;
pub mod setup;
pub mod state;
pub mod telemetry;

pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;
