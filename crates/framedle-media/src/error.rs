//! Error types for media operations.

use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur during media processing.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("FFmpeg not found in PATH")]
    FfmpegNotFound,

    #[error("yt-dlp not found in PATH")]
    YtDlpNotFound,

    #[error("FFmpeg command failed: {message}")]
    FfmpegFailed {
        message: String,
        stderr: Option<String>,
        exit_code: Option<i32>,
    },

    #[error("Operation timed out after {0} seconds")]
    Timeout(u64),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Metadata lookup failed: {0}")]
    MetadataFailed(String),

    #[error("Frame extraction failed at {timestamp:.3}s: {message}")]
    ExtractionFailed { timestamp: f64, message: String },

    #[error("Image decode failed: {0}")]
    DecodeFailed(String),

    #[error("Image encoding failed: {0}")]
    EncodingFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl MediaError {
    /// Create an FFmpeg failure error.
    pub fn ffmpeg_failed(
        message: impl Into<String>,
        stderr: Option<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::FfmpegFailed {
            message: message.into(),
            stderr,
            exit_code,
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn metadata_failed(message: impl Into<String>) -> Self {
        Self::MetadataFailed(message.into())
    }

    pub fn extraction_failed(timestamp: f64, message: impl Into<String>) -> Self {
        Self::ExtractionFailed {
            timestamp,
            message: message.into(),
        }
    }

    pub fn encoding_failed(message: impl Into<String>) -> Self {
        Self::EncodingFailed(message.into())
    }

    /// Diagnostic text, including captured stderr when there is any.
    pub fn diagnostic(&self) -> String {
        match self {
            MediaError::FfmpegFailed {
                message,
                stderr: Some(stderr),
                ..
            } if !stderr.is_empty() => format!("{}: {}", message, stderr),
            other => other.to_string(),
        }
    }
}
