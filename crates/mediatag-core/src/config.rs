//! Configuration module
//!
//! Everything is read from the environment once at startup. `Config::from_env` validates the
//! result and fails fast, so no tagging call is reachable with a half-configured process.

use std::env;
use std::time::Duration;

use crate::storage_types::{CatalogBackend, StorageBackend, TaggingBackend};

const DEFAULT_PORT: u16 = 4000;
const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const MAX_UPLOAD_SIZE_MB: usize = 100;
const PRESIGNED_URL_TTL_SECS: u64 = 3600;
const HTTP_CONCURRENCY_LIMIT: usize = 10_000;
const DEFAULT_LLM_API_URL: &str = "https://api.openai.com/v1";
const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";
const LLM_TIMEOUT_SECS: u64 = 30;

/// Fixed knobs of the tag-derivation pipeline.
///
/// Caps and confidences are constants of the tagging contract; poll cadence, attempt ceilings
/// and language codes come from the environment.
#[derive(Clone, Debug, PartialEq)]
pub struct TaggingSettings {
    pub image_max_labels: i32,
    pub image_min_confidence: f32,
    pub video_min_confidence: f32,
    /// Cap for text, audio and video tag sets
    pub max_tags: usize,
    pub text_max_chars: usize,
    pub poll_interval: Duration,
    pub transcribe_max_attempts: u32,
    pub video_max_attempts: u32,
    pub transcribe_language_code: String,
    pub key_phrase_language_code: String,
}

impl Default for TaggingSettings {
    fn default() -> Self {
        Self {
            image_max_labels: 5,
            image_min_confidence: 80.0,
            video_min_confidence: 70.0,
            max_tags: 10,
            text_max_chars: 5000,
            poll_interval: Duration::from_millis(1000),
            transcribe_max_attempts: 60,
            video_max_attempts: 300,
            transcribe_language_code: "en-US".to_string(),
            key_phrase_language_code: "en".to_string(),
        }
    }
}

/// OpenAI-compatible chat completions endpoint used to expand search queries into keywords.
#[derive(Clone, PartialEq)]
pub struct KeywordExpansionSettings {
    /// Base URL; `/chat/completions` is appended
    pub api_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for KeywordExpansionSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeywordExpansionSettings")
            .field("api_url", &self.api_url)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Server-level settings
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub max_upload_size_bytes: usize,
    /// In-flight request ceiling for the HTTP server
    pub http_concurrency_limit: usize,
    pub environment: String,
}

#[derive(Clone, Debug)]
pub struct MediaTagConfig {
    pub base: BaseConfig,
    // Object storage
    pub storage_backend: StorageBackend,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // MinIO, LocalStack and other S3-compatible providers
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    pub presigned_url_ttl: Duration,
    // Catalog
    pub catalog_backend: CatalogBackend,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    // Tagging
    pub tagging_backend: TaggingBackend,
    pub aws_region: Option<String>,
    pub tagging: TaggingSettings,
    // Search
    pub keyword_expansion: Option<KeywordExpansionSettings>,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<MediaTagConfig>);

impl Config {
    fn inner(&self) -> &MediaTagConfig {
        &self.0
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        let config = MediaTagConfig::from_lookup(|name| env::var(name).ok())?;
        Ok(Config(Box::new(config)))
    }

    /// Build from an arbitrary variable source. Used by tests and embedders that do not want
    /// to touch the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Config(Box::new(MediaTagConfig::from_lookup(lookup)?)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.inner().validate()
    }

    pub fn is_production(&self) -> bool {
        is_production_env(&self.inner().base.environment)
    }

    pub fn environment(&self) -> &str {
        &self.inner().base.environment
    }

    pub fn server_port(&self) -> u16 {
        self.inner().base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.inner().base.cors_origins
    }

    pub fn max_upload_size_bytes(&self) -> usize {
        self.inner().base.max_upload_size_bytes
    }

    pub fn http_concurrency_limit(&self) -> usize {
        self.inner().base.http_concurrency_limit
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.inner().storage_backend
    }

    pub fn s3_bucket(&self) -> Option<&str> {
        self.inner().s3_bucket.as_deref()
    }

    /// `S3_REGION`, falling back to `AWS_REGION`.
    pub fn s3_region(&self) -> Option<&str> {
        self.inner()
            .s3_region
            .as_deref()
            .or(self.inner().aws_region.as_deref())
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.inner().s3_endpoint.as_deref()
    }

    pub fn local_storage_path(&self) -> Option<&str> {
        self.inner().local_storage_path.as_deref()
    }

    pub fn local_storage_base_url(&self) -> Option<&str> {
        self.inner().local_storage_base_url.as_deref()
    }

    pub fn presigned_url_ttl(&self) -> Duration {
        self.inner().presigned_url_ttl
    }

    pub fn catalog_backend(&self) -> CatalogBackend {
        self.inner().catalog_backend
    }

    pub fn database_url(&self) -> Option<&str> {
        self.inner().database_url.as_deref()
    }

    pub fn db_max_connections(&self) -> u32 {
        self.inner().db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.inner().db_timeout_seconds
    }

    pub fn tagging_backend(&self) -> TaggingBackend {
        self.inner().tagging_backend
    }

    pub fn aws_region(&self) -> Option<&str> {
        self.inner().aws_region.as_deref()
    }

    pub fn tagging(&self) -> &TaggingSettings {
        &self.inner().tagging
    }

    pub fn keyword_expansion(&self) -> Option<&KeywordExpansionSettings> {
        self.inner().keyword_expansion.as_ref()
    }
}

pub fn is_production_env(environment: &str) -> bool {
    let env = environment.to_lowercase();
    env == "production" || env == "prod"
}

/// Parsed value of `name`, or `default` when unset or blank. Malformed values are an error.
fn parse_or<T, F>(lookup: &F, name: &str, default: T) -> Result<T, anyhow::Error>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match non_empty(lookup, name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("{} must be a valid number, got {:?}", name, value)),
        None => Ok(default),
    }
}

fn non_empty<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name).filter(|s| !s.trim().is_empty())
}

impl MediaTagConfig {
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let cors_origins_str = lookup("CORS_ORIGINS").unwrap_or_else(|| "*".to_string());
        if is_production_env(&environment) && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }
        let cors_origins = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let max_upload_size_mb: usize =
            parse_or(&lookup, "MAX_UPLOAD_SIZE_MB", MAX_UPLOAD_SIZE_MB)?;
        let max_upload_size_bytes = max_upload_size_mb
            .checked_mul(1024 * 1024)
            .ok_or_else(|| anyhow::anyhow!("MAX_UPLOAD_SIZE_MB is too large"))?;

        let base = BaseConfig {
            server_port: match lookup("PORT") {
                Some(port) => port
                    .trim()
                    .parse()
                    .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
                None => DEFAULT_PORT,
            },
            cors_origins,
            max_upload_size_bytes,
            http_concurrency_limit: parse_or(
                &lookup,
                "HTTP_CONCURRENCY_LIMIT",
                HTTP_CONCURRENCY_LIMIT,
            )?
            .max(1),
            environment,
        };

        let storage_backend = match lookup("STORAGE_BACKEND") {
            Some(value) => value.parse()?,
            None => StorageBackend::S3,
        };
        let catalog_backend = match lookup("CATALOG_BACKEND") {
            Some(value) => value.parse()?,
            None => CatalogBackend::Postgres,
        };
        let tagging_backend = match lookup("TAGGING_BACKEND") {
            Some(value) => value.parse()?,
            None => TaggingBackend::Aws,
        };

        let defaults = TaggingSettings::default();
        let tagging = TaggingSettings {
            poll_interval: Duration::from_millis(parse_or(
                &lookup,
                "TAGGING_POLL_INTERVAL_MS",
                defaults.poll_interval.as_millis() as u64,
            )?),
            transcribe_max_attempts: parse_or(
                &lookup,
                "TRANSCRIBE_MAX_ATTEMPTS",
                defaults.transcribe_max_attempts,
            )?,
            video_max_attempts: parse_or(
                &lookup,
                "VIDEO_LABELS_MAX_ATTEMPTS",
                defaults.video_max_attempts,
            )?,
            transcribe_language_code: non_empty(&lookup, "TRANSCRIBE_LANGUAGE_CODE")
                .unwrap_or_else(|| defaults.transcribe_language_code.clone()),
            key_phrase_language_code: non_empty(&lookup, "KEY_PHRASE_LANGUAGE_CODE")
                .unwrap_or_else(|| defaults.key_phrase_language_code.clone()),
            ..defaults
        };

        // Query expansion is on only when an API key is configured
        let keyword_expansion = match non_empty(&lookup, "LLM_API_KEY") {
            Some(api_key) => Some(KeywordExpansionSettings {
                api_url: non_empty(&lookup, "LLM_API_URL")
                    .unwrap_or_else(|| DEFAULT_LLM_API_URL.to_string()),
                api_key,
                model: non_empty(&lookup, "LLM_MODEL")
                    .unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
                timeout: Duration::from_secs(parse_or(
                    &lookup,
                    "LLM_TIMEOUT_SECS",
                    LLM_TIMEOUT_SECS,
                )?),
            }),
            None => None,
        };

        let config = MediaTagConfig {
            base,
            storage_backend,
            s3_bucket: non_empty(&lookup, "S3_BUCKET"),
            s3_region: non_empty(&lookup, "S3_REGION"),
            s3_endpoint: non_empty(&lookup, "S3_ENDPOINT"),
            local_storage_path: non_empty(&lookup, "LOCAL_STORAGE_PATH"),
            local_storage_base_url: non_empty(&lookup, "LOCAL_STORAGE_BASE_URL"),
            presigned_url_ttl: Duration::from_secs(parse_or(
                &lookup,
                "PRESIGNED_URL_TTL_SECS",
                PRESIGNED_URL_TTL_SECS,
            )?),
            catalog_backend,
            database_url: non_empty(&lookup, "DATABASE_URL"),
            db_max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", MAX_CONNECTIONS)?,
            db_timeout_seconds: parse_or(&lookup, "DB_TIMEOUT_SECONDS", CONNECTION_TIMEOUT_SECS)?,
            tagging_backend,
            aws_region: non_empty(&lookup, "AWS_REGION"),
            tagging,
            keyword_expansion,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        match self.storage_backend {
            StorageBackend::S3 => {
                if self.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET must be set when using S3 storage backend"
                    ));
                }
                if self.s3_region.is_none() && self.aws_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
                if self.local_storage_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_BASE_URL must be set when using local storage backend"
                    ));
                }
            }
        }

        if self.catalog_backend == CatalogBackend::Postgres {
            match self.database_url.as_deref() {
                None => {
                    return Err(anyhow::anyhow!(
                        "DATABASE_URL must be set when using postgres catalog backend"
                    ))
                }
                Some(url)
                    if !url.starts_with("postgres://") && !url.starts_with("postgresql://") =>
                {
                    return Err(anyhow::anyhow!(
                        "DATABASE_URL must be a valid PostgreSQL connection string"
                    ))
                }
                Some(_) => {}
            }
        }

        if self.tagging_backend == TaggingBackend::Aws {
            if self.aws_region.is_none() {
                return Err(anyhow::anyhow!(
                    "AWS_REGION must be set when TAGGING_BACKEND=aws"
                ));
            }
            // Rekognition and Transcribe read media straight from the bucket.
            if self.storage_backend != StorageBackend::S3 {
                return Err(anyhow::anyhow!(
                    "TAGGING_BACKEND=aws requires STORAGE_BACKEND=s3"
                ));
            }
        }

        if self.tagging.transcribe_max_attempts == 0 || self.tagging.video_max_attempts == 0 {
            return Err(anyhow::anyhow!(
                "TRANSCRIBE_MAX_ATTEMPTS and VIDEO_LABELS_MAX_ATTEMPTS must be at least 1"
            ));
        }

        if let Some(expansion) = &self.keyword_expansion {
            if !expansion.api_url.starts_with("http://")
                && !expansion.api_url.starts_with("https://")
            {
                return Err(anyhow::anyhow!("LLM_API_URL must be an http(s) URL"));
            }
        }

        if self.presigned_url_ttl.is_zero() {
            return Err(anyhow::anyhow!("PRESIGNED_URL_TTL_SECS must be positive"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    fn local_memory_disabled() -> Vec<(&'static str, &'static str)> {
        vec![
            ("STORAGE_BACKEND", "local"),
            ("LOCAL_STORAGE_PATH", "/tmp/mediatag"),
            ("LOCAL_STORAGE_BASE_URL", "http://localhost:4000/media"),
            ("CATALOG_BACKEND", "memory"),
            ("TAGGING_BACKEND", "disabled"),
        ]
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = Config::from_lookup(lookup_from(&local_memory_disabled())).unwrap();
        assert_eq!(config.server_port(), 4000);
        assert_eq!(config.max_upload_size_bytes(), 100 * 1024 * 1024);
        assert_eq!(config.presigned_url_ttl(), Duration::from_secs(3600));
        assert_eq!(config.tagging(), &TaggingSettings::default());
        assert!(!config.is_production());
    }

    #[test]
    fn s3_backend_requires_bucket_and_region() {
        let err = Config::from_lookup(lookup_from(&[
            ("STORAGE_BACKEND", "s3"),
            ("CATALOG_BACKEND", "memory"),
            ("TAGGING_BACKEND", "disabled"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("S3_BUCKET"));

        let err = Config::from_lookup(lookup_from(&[
            ("S3_BUCKET", "media"),
            ("CATALOG_BACKEND", "memory"),
            ("TAGGING_BACKEND", "disabled"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("S3_REGION"));
    }

    #[test]
    fn s3_region_falls_back_to_aws_region() {
        let config = Config::from_lookup(lookup_from(&[
            ("S3_BUCKET", "media"),
            ("AWS_REGION", "eu-west-1"),
            ("CATALOG_BACKEND", "memory"),
        ]))
        .unwrap();
        assert_eq!(config.s3_region(), Some("eu-west-1"));
        assert_eq!(config.tagging_backend(), TaggingBackend::Aws);
    }

    #[test]
    fn aws_tagging_requires_region() {
        let mut vars = local_memory_disabled();
        vars.retain(|(k, _)| *k != "TAGGING_BACKEND");
        let err = Config::from_lookup(lookup_from(&vars)).unwrap_err();
        assert!(err.to_string().contains("AWS_REGION"));
    }

    #[test]
    fn aws_tagging_requires_s3_storage() {
        let mut vars = local_memory_disabled();
        vars.retain(|(k, _)| *k != "TAGGING_BACKEND");
        vars.push(("AWS_REGION", "us-east-1"));
        let err = Config::from_lookup(lookup_from(&vars)).unwrap_err();
        assert!(err.to_string().contains("STORAGE_BACKEND=s3"));
    }

    #[test]
    fn postgres_catalog_requires_valid_url() {
        let mut vars = local_memory_disabled();
        vars.retain(|(k, _)| *k != "CATALOG_BACKEND");
        let err = Config::from_lookup(lookup_from(&vars)).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));

        vars.push(("DATABASE_URL", "mysql://nope"));
        let err = Config::from_lookup(lookup_from(&vars)).unwrap_err();
        assert!(err.to_string().contains("PostgreSQL"));
    }

    #[test]
    fn wildcard_cors_rejected_in_production() {
        let mut vars = local_memory_disabled();
        vars.push(("ENVIRONMENT", "production"));
        let err = Config::from_lookup(lookup_from(&vars)).unwrap_err();
        assert!(err.to_string().contains("CORS_ORIGINS"));
    }

    #[test]
    fn tagging_overrides_are_read() {
        let mut vars = local_memory_disabled();
        vars.extend([
            ("TAGGING_POLL_INTERVAL_MS", "250"),
            ("TRANSCRIBE_MAX_ATTEMPTS", "5"),
            ("VIDEO_LABELS_MAX_ATTEMPTS", "7"),
            ("TRANSCRIBE_LANGUAGE_CODE", "fr-FR"),
        ]);
        let config = Config::from_lookup(lookup_from(&vars)).unwrap();
        let tagging = config.tagging();
        assert_eq!(tagging.poll_interval, Duration::from_millis(250));
        assert_eq!(tagging.transcribe_max_attempts, 5);
        assert_eq!(tagging.video_max_attempts, 7);
        assert_eq!(tagging.transcribe_language_code, "fr-FR");
        assert_eq!(tagging.key_phrase_language_code, "en");
        assert_eq!(tagging.max_tags, 10);
    }

    #[test]
    fn zero_attempt_ceiling_is_rejected() {
        let mut vars = local_memory_disabled();
        vars.push(("TRANSCRIBE_MAX_ATTEMPTS", "0"));
        assert!(Config::from_lookup(lookup_from(&vars)).is_err());
    }

    #[test]
    fn malformed_numbers_fail_fast() {
        for (name, value) in [
            ("TRANSCRIBE_MAX_ATTEMPTS", "abc"),
            ("PORT", "eighty"),
            ("MAX_UPLOAD_SIZE_MB", "-1"),
            ("TAGGING_POLL_INTERVAL_MS", "1.5"),
            ("DB_MAX_CONNECTIONS", "many"),
        ] {
            let mut vars = local_memory_disabled();
            vars.push((name, value));
            let err = Config::from_lookup(lookup_from(&vars)).unwrap_err();
            assert!(err.to_string().contains(name), "{}: {}", name, err);
        }
    }

    #[test]
    fn blank_numbers_use_defaults() {
        let mut vars = local_memory_disabled();
        vars.push(("VIDEO_LABELS_MAX_ATTEMPTS", "  "));
        let config = Config::from_lookup(lookup_from(&vars)).unwrap();
        assert_eq!(config.tagging().video_max_attempts, 300);
    }

    #[test]
    fn oversized_upload_limit_is_rejected() {
        let mut vars = local_memory_disabled();
        let huge = usize::MAX.to_string();
        vars.push(("MAX_UPLOAD_SIZE_MB", huge.as_str()));
        let err = Config::from_lookup(lookup_from(&vars)).unwrap_err();
        assert!(err.to_string().contains("too large"));
    }

    #[test]
    fn keyword_expansion_needs_an_api_key() {
        let config = Config::from_lookup(lookup_from(&local_memory_disabled())).unwrap();
        assert!(config.keyword_expansion().is_none());

        let mut vars = local_memory_disabled();
        vars.extend([("LLM_API_KEY", "sk-test"), ("LLM_MODEL", "small-model")]);
        let config = Config::from_lookup(lookup_from(&vars)).unwrap();
        let expansion = config.keyword_expansion().unwrap();
        assert_eq!(expansion.api_url, "https://api.openai.com/v1");
        assert_eq!(expansion.model, "small-model");
        assert_eq!(expansion.timeout, Duration::from_secs(30));
        assert!(!format!("{:?}", expansion).contains("sk-test"));

        vars.push(("LLM_API_URL", "ftp://llm"));
        assert!(Config::from_lookup(lookup_from(&vars)).is_err());
    }

    #[test]
    fn invalid_backend_name_fails() {
        let mut vars = local_memory_disabled();
        vars.push(("CATALOG_BACKEND", "dynamo"));
        // later entries win in the HashMap
        let err = Config::from_lookup(lookup_from(&vars)).unwrap_err();
        assert!(err.to_string().contains("catalog backend"));
    }
}
