//! Worker error types.
//!
//! One variant per pipeline failure class; every crate error is mapped onto
//! this taxonomy before it reaches the batch driver.

use thiserror::Error;

use framedle_catalog::CatalogError;
use framedle_media::MediaError;
use framedle_storage::StorageError;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Invalid input: {0}")]
    Input(String),

    #[error("Metadata lookup failed: {0}")]
    Metadata(String),

    #[error("Frame extraction failed{}: {message}", at_timestamp(.timestamp))]
    Extraction {
        timestamp: Option<f64>,
        message: String,
    },

    #[error("Encoding failed: {0}")]
    Encoding(String),

    #[error("Publish failed: {0}")]
    Publish(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Catalog storage failed: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn at_timestamp(timestamp: &Option<f64>) -> String {
    timestamp
        .map(|t| format!(" at {:.3}s", t))
        .unwrap_or_default()
}

impl WorkerError {
    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn extraction(timestamp: f64, msg: impl Into<String>) -> Self {
        Self::Extraction {
            timestamp: Some(timestamp),
            message: msg.into(),
        }
    }

    /// Name of the pipeline stage that failed.
    pub fn stage(&self) -> &'static str {
        match self {
            WorkerError::Input(_) => "input",
            WorkerError::Metadata(_) => "metadata",
            WorkerError::Extraction { .. } => "extraction",
            WorkerError::Encoding(_) => "encoding",
            WorkerError::Publish(_) => "publish",
            WorkerError::Configuration(_) => "configuration",
            WorkerError::Storage(_) => "storage",
            WorkerError::Io(_) => "io",
        }
    }

    /// Check if retrying the whole video could succeed.
    ///
    /// Bad input, missing configuration and deterministic encoding failures
    /// fail the same way every time.
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            WorkerError::Input(_) | WorkerError::Configuration(_) | WorkerError::Encoding(_)
        )
    }
}

impl From<MediaError> for WorkerError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::InvalidInput(msg) => WorkerError::Input(msg),
            MediaError::MetadataFailed(msg) => WorkerError::Metadata(msg),
            MediaError::JsonParse(e) => WorkerError::Metadata(e.to_string()),
            MediaError::FfmpegNotFound | MediaError::YtDlpNotFound => {
                WorkerError::Configuration(err.to_string())
            }
            MediaError::ExtractionFailed { timestamp, message } => WorkerError::Extraction {
                timestamp: Some(timestamp),
                message,
            },
            MediaError::FfmpegFailed { .. } | MediaError::Timeout(_) | MediaError::DecodeFailed(_) => {
                WorkerError::Extraction {
                    timestamp: None,
                    message: err.diagnostic(),
                }
            }
            MediaError::EncodingFailed(msg) => WorkerError::Encoding(msg),
            MediaError::Io(e) => WorkerError::Io(e),
        }
    }
}

impl From<StorageError> for WorkerError {
    fn from(err: StorageError) -> Self {
        WorkerError::Publish(err.to_string())
    }
}

impl From<CatalogError> for WorkerError {
    fn from(err: CatalogError) -> Self {
        if err.is_configuration() {
            WorkerError::Configuration(err.to_string())
        } else {
            WorkerError::Storage(err.to_string())
        }
    }
}
