//! Blob sink abstraction.

use async_trait::async_trait;

use crate::error::StorageResult;

/// Write-only object storage.
///
/// Writes overwrite by key, so repeating a `put` is always safe.
#[async_trait]
pub trait BlobSink: Send + Sync {
    /// Store `bytes` under `key` and return the object's location.
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
        cache_control: &str,
    ) -> StorageResult<String>;
}
