//! API constants

/// Versioned path prefix for every file route
pub const API_PREFIX: &str = "/api/v0";
