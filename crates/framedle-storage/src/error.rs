//! Storage error types.

use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed for {key}: {message}")]
    UploadFailed { key: String, message: String },

    #[error("AWS SDK error: {0}")]
    AwsSdk(String),
}

impl StorageError {
    pub fn upload_failed(key: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::UploadFailed {
            key: key.into(),
            message: msg.into(),
        }
    }
}
