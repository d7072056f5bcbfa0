//! Extension to tagging strategy routing.

use std::collections::HashMap;
use std::fmt::{Display, Formatter, Result as FmtResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    Image,
    Text,
    Audio,
    Video,
}

impl Display for Strategy {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Strategy::Image => write!(f, "image"),
            Strategy::Text => write!(f, "text"),
            Strategy::Audio => write!(f, "audio"),
            Strategy::Video => write!(f, "video"),
        }
    }
}

const DEFAULT_ROUTES: &[(&str, Strategy)] = &[
    ("jpg", Strategy::Image),
    ("jpeg", Strategy::Image),
    ("png", Strategy::Image),
    ("txt", Strategy::Text),
    ("md", Strategy::Text),
    ("mp3", Strategy::Audio),
    ("wav", Strategy::Audio),
    ("mp4", Strategy::Video),
    ("mov", Strategy::Video),
];

/// Case-insensitive extension table.
#[derive(Debug, Clone)]
pub struct StrategyTable {
    routes: HashMap<String, Strategy>,
}

impl Default for StrategyTable {
    fn default() -> Self {
        Self::new()
    }
}

impl StrategyTable {
    pub fn new() -> Self {
        Self::empty().with_routes(DEFAULT_ROUTES.iter().copied())
    }

    pub fn empty() -> Self {
        Self {
            routes: HashMap::new(),
        }
    }

    /// Add or override routes. Extensions are matched without the leading dot.
    pub fn with_routes<'a, I>(mut self, routes: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, Strategy)>,
    {
        for (extension, strategy) in routes {
            self.routes.insert(normalize_extension(extension), strategy);
        }
        self
    }

    pub fn select(&self, extension: &str) -> Option<Strategy> {
        self.routes.get(&normalize_extension(extension)).copied()
    }
}

fn normalize_extension(extension: &str) -> String {
    extension.trim().trim_start_matches('.').to_lowercase()
}

/// Route with the built-in table.
pub fn select_strategy(extension: &str) -> Option<Strategy> {
    DEFAULT_ROUTES
        .iter()
        .find(|(ext, _)| ext.eq_ignore_ascii_case(extension.trim().trim_start_matches('.')))
        .map(|(_, strategy)| *strategy)
}
