//! Structured logging utilities.
//!
//! Provides tracing initialization for the binaries and a per-video logger
//! with consistent contextual fields.

use tracing::{error, info, warn, Span};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use framedle_models::VideoId;

/// Initialize tracing: human-readable output by default, JSON when
/// `LOG_FORMAT=json`.
pub fn init_tracing() {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("framedle=info"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
}

/// Video logger for structured logging with consistent formatting.
///
/// Every line carries the video id and the operation being performed.
#[derive(Debug, Clone)]
pub struct VideoLogger {
    video_id: String,
    operation: String,
}

impl VideoLogger {
    pub fn new(video_id: &VideoId, operation: &str) -> Self {
        Self::from_string(video_id.as_str(), operation)
    }

    /// Logger for a video whose id is not resolved yet (e.g. a raw URL).
    pub fn from_string(video_id: &str, operation: &str) -> Self {
        Self {
            video_id: video_id.to_string(),
            operation: operation.to_string(),
        }
    }

    pub fn log_start(&self, message: &str) {
        info!(
            video_id = %self.video_id,
            operation = %self.operation,
            "Video started: {}", message
        );
    }

    pub fn log_progress(&self, message: &str) {
        info!(
            video_id = %self.video_id,
            operation = %self.operation,
            "Video progress: {}", message
        );
    }

    pub fn log_warning(&self, message: &str) {
        warn!(
            video_id = %self.video_id,
            operation = %self.operation,
            "Video warning: {}", message
        );
    }

    pub fn log_error(&self, stage: &str, message: &str) {
        error!(
            video_id = %self.video_id,
            operation = %self.operation,
            stage = stage,
            "Video failed: {}", message
        );
    }

    pub fn log_completion(&self, message: &str) {
        info!(
            video_id = %self.video_id,
            operation = %self.operation,
            "Video completed: {}", message
        );
    }

    pub fn video_id(&self) -> &str {
        &self.video_id
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Create a tracing span for this video.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "video",
            video_id = %self.video_id,
            operation = %self.operation
        )
    }
}
