//! R2 client implementation.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::{Builder, Region};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tracing::{debug, info};

use framedle_models::constants::DEFAULT_BUCKET;

use crate::error::{StorageError, StorageResult};
use crate::sink::BlobSink;

/// Configuration for R2 client.
#[derive(Debug, Clone)]
pub struct R2Config {
    /// R2 endpoint URL (S3 API endpoint)
    pub endpoint_url: String,
    /// Access key ID
    pub access_key_id: String,
    /// Secret access key
    pub secret_access_key: String,
    /// Bucket name
    pub bucket_name: String,
    /// Region (usually "auto" for R2)
    pub region: String,
}

impl R2Config {
    /// Create config from environment variables; `None` when endpoint or
    /// credentials are missing.
    pub fn from_env_optional() -> Option<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Some(Self {
            endpoint_url: non_empty("R2_ENDPOINT")?,
            access_key_id: non_empty("R2_ACCESS_KEY")?,
            secret_access_key: non_empty("R2_SECRET_KEY")?,
            bucket_name: non_empty("R2_BUCKET").unwrap_or_else(|| DEFAULT_BUCKET.to_string()),
            region: non_empty("R2_REGION").unwrap_or_else(|| "auto".to_string()),
        })
    }
}

/// Cloudflare R2 storage client.
#[derive(Clone)]
pub struct R2Client {
    client: Client,
    bucket: String,
}

impl R2Client {
    /// Create a new R2 client from configuration.
    pub fn new(config: R2Config) -> Self {
        let credentials = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "r2",
        );

        let sdk_config = Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(&config.endpoint_url)
            .region(Region::new(config.region))
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        Self {
            client: Client::from_conf(sdk_config),
            bucket: config.bucket_name,
        }
    }

    /// Create from environment variables, `None` in degraded mode.
    pub fn from_env_optional() -> Option<Self> {
        R2Config::from_env_optional().map(Self::new)
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Upload bytes to R2.
    pub async fn upload_bytes(
        &self,
        data: Vec<u8>,
        key: &str,
        content_type: &str,
        cache_control: &str,
    ) -> StorageResult<()> {
        debug!("Uploading {} bytes to {}", data.len(), key);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data))
            .content_type(content_type)
            .cache_control(cache_control)
            .send()
            .await
            .map_err(|e| StorageError::upload_failed(key, e.to_string()))?;

        Ok(())
    }

    /// Check if R2 is reachable and the bucket exists.
    pub async fn check_connectivity(&self) -> StorageResult<()> {
        self.client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(|e| StorageError::AwsSdk(format!("R2 connectivity check failed: {}", e)))?;
        info!("R2 bucket {} reachable", self.bucket);
        Ok(())
    }
}

#[async_trait]
impl BlobSink for R2Client {
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
        cache_control: &str,
    ) -> StorageResult<String> {
        self.upload_bytes(bytes, key, content_type, cache_control)
            .await?;
        Ok(key.to_string())
    }
}
