use serde::Serialize;

/// Initialize tracing for CLI binaries. Logs go to stderr so stdout stays JSON.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[derive(Debug, Serialize)]
pub struct DeleteReport {
    pub key: String,
    pub success: bool,
    pub message: String,
}

impl DeleteReport {
    pub fn new(key: &str, success: bool) -> Self {
        let message = if success {
            format!("{} deleted", key)
        } else {
            format!("{} was only partially deleted; see logs", key)
        };
        Self {
            key: key.to_string(),
            success,
            message,
        }
    }
}
