//! Shared application state

use mediatag_core::Config;
use mediatag_services::MediaLibrary;

#[derive(Clone)]
pub struct AppState {
    pub library: MediaLibrary,
    pub config: Config,
}

impl AppState {
    pub fn new(library: MediaLibrary, config: Config) -> Self {
        Self { library, config }
    }
}
