use crate::traits::{Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use http::Method;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::signer::Signer;
use object_store::Error as ObjectStoreError;
use object_store::{
    Attribute, Attributes, ObjectStoreExt, PutOptions, PutPayload, Result as ObjectResult,
};
use std::time::Duration;

/// S3 storage implementation
#[derive(Clone)]
pub struct S3Storage {
    store: AmazonS3,
    bucket: String,
    region: String,
    endpoint_url: Option<String>, // Custom endpoint for S3-compatible providers
}

impl S3Storage {
    /// Create a new S3Storage instance
    ///
    /// # Arguments
    /// * `bucket` - S3 bucket name
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    pub fn new(
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
    ) -> StorageResult<Self> {
        // Credentials come from the standard AWS environment variables.
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region.clone())
            .with_bucket_name(bucket.clone());

        if let Some(ref endpoint) = endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(S3Storage {
            store,
            bucket,
            region,
            endpoint_url,
        })
    }
}

/// Public URL for an object.
///
/// AWS uses virtual-hosted style `https://{bucket}.s3.{region}.amazonaws.com/{key}`;
/// custom endpoints use path style `{endpoint}/{bucket}/{key}`.
fn public_url(bucket: &str, region: &str, endpoint_url: Option<&str>, key: &str) -> String {
    match endpoint_url {
        Some(endpoint) => format!("{}/{}/{}", endpoint.trim_end_matches('/'), bucket, key),
        None => format!("https://{}.s3.{}.amazonaws.com/{}", bucket, region, key),
    }
}

/// Object path for `key`, which must already be in object_store's canonical form.
///
/// `Path::from` percent-encodes characters such as `[`, `#`, `%` and `~`. A key it would
/// rewrite is rejected so the stored object and the key the catalog and AWS services use
/// never diverge.
fn object_path(key: &str) -> StorageResult<Path> {
    let location = Path::from(key);
    if location.as_ref() != key {
        return Err(StorageError::InvalidKey(format!(
            "Key {} is not a canonical object path (would be stored as {})",
            key, location
        )));
    }
    Ok(location)
}

/// Put options recording the object's `Content-Type`.
fn put_options(content_type: &str) -> PutOptions {
    PutOptions {
        attributes: Attributes::from_iter([(
            Attribute::ContentType,
            object_store::AttributeValue::from(content_type.to_string()),
        )]),
        ..Default::default()
    }
}

#[async_trait]
impl Storage for S3Storage {
    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> StorageResult<()> {
        let size = data.len() as u64;
        let location = object_path(key)?;
        let start = std::time::Instant::now();

        let result: ObjectResult<_> = object_store::ObjectStore::put_opts(
            &self.store,
            &location,
            PutPayload::from(Bytes::from(data)),
            put_options(content_type),
        )
        .await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %key,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 upload failed"
            );
            StorageError::UploadFailed(e.to_string())
        })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            content_type = %content_type,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(())
    }

    async fn get(&self, key: &str) -> StorageResult<Vec<u8>> {
        let start = std::time::Instant::now();
        let location = object_path(key)?;

        let result: ObjectResult<_> = self.store.get(&location).await;

        let result = result.map_err(|e| match e {
            ObjectStoreError::NotFound { .. } => StorageError::NotFound(key.to_string()),
            other => {
                tracing::error!(
                    error = %other,
                    bucket = %self.bucket,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 download failed"
                );
                StorageError::DownloadFailed(other.to_string())
            }
        })?;

        let bytes = result
            .bytes()
            .await
            .map_err(|e| StorageError::DownloadFailed(e.to_string()))?;

        tracing::debug!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = bytes.len() as u64,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 download successful"
        );

        Ok(bytes.to_vec())
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let start = std::time::Instant::now();
        let location = object_path(key)?;

        let result: ObjectResult<_> = self.store.delete(&location).await;

        match result {
            Ok(()) | Err(ObjectStoreError::NotFound { .. }) => {}
            Err(e) => {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 delete failed"
                );
                return Err(StorageError::DeleteFailed(e.to_string()));
            }
        }

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 delete successful"
        );

        Ok(())
    }

    async fn presigned_get_url(&self, key: &str, expires_in: Duration) -> StorageResult<String> {
        let location = object_path(key)?;
        let url_result: ObjectResult<_> = self
            .store
            .signed_url(Method::GET, &location, expires_in)
            .await;

        let url = url_result
            .map_err(|e| StorageError::BackendError(e.to_string()))?
            .to_string();

        Ok(url)
    }

    fn object_url(&self, key: &str) -> String {
        public_url(&self.bucket, &self.region, self.endpoint_url.as_deref(), key)
    }

    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::make_key;

    #[test]
    fn aws_url_is_virtual_hosted() {
        assert_eq!(
            public_url("media", "eu-west-1", None, "1_abc_photo.jpg"),
            "https://media.s3.eu-west-1.amazonaws.com/1_abc_photo.jpg"
        );
    }

    #[test]
    fn custom_endpoint_url_is_path_style() {
        assert_eq!(
            public_url("media", "us-east-1", Some("http://localhost:9000/"), "k"),
            "http://localhost:9000/media/k"
        );
    }

    #[test]
    fn generated_keys_are_canonical_object_paths() {
        for name in [
            "song [live].mp3",
            "track #1.mp3",
            "50% off.jpg",
            "a~b.png",
            "{x}^|<y>.txt",
            "what?*.md",
            "café.mov",
            "plain_name.wav",
        ] {
            let key = make_key(name);
            assert_eq!(Path::from(key.as_str()).as_ref(), key, "name {:?}", name);
            assert!(object_path(&key).is_ok());
        }
    }

    #[test]
    fn non_canonical_keys_are_rejected() {
        let err = object_path("1_abc_song [live].mp3").unwrap_err();
        assert!(matches!(err, StorageError::InvalidKey(_)));
        assert!(object_path("1_abc_a~b.png").is_err());
        assert!(object_path("1_abc_photo.jpg").is_ok());
    }

    #[test]
    fn put_options_carry_content_type() {
        let opts = put_options("image/jpeg");
        let content_type: &str = opts
            .attributes
            .get(&Attribute::ContentType)
            .expect("content type attribute");
        assert_eq!(content_type, "image/jpeg");
    }

    #[tokio::test]
    async fn rejected_key_never_reaches_the_network() {
        let storage = S3Storage::new(
            "media".to_string(),
            "us-east-1".to_string(),
            Some("http://127.0.0.1:1".to_string()),
        )
        .unwrap();
        let err = storage
            .put("1_abc_50% off.jpg", b"x".to_vec(), "image/jpeg")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::InvalidKey(_)));
    }

    #[test]
    fn builds_against_custom_endpoint_without_network() {
        let storage = S3Storage::new(
            "media".to_string(),
            "us-east-1".to_string(),
            Some("http://localhost:9000".to_string()),
        )
        .unwrap();
        assert_eq!(storage.bucket(), "media");
        assert_eq!(storage.backend_type(), StorageBackend::S3);
        assert_eq!(storage.object_url("k"), "http://localhost:9000/media/k");
    }
}
