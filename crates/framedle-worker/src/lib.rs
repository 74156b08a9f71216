//! Framedle frame extraction worker.
//!
//! This crate provides:
//! - The per-video frame pipeline (metadata, peak selection, grabbing, variants)
//! - End-to-end processing into blob storage and the catalog
//! - A batch driver with bounded concurrency and retries
//! - Configuration, logging and metrics for the binaries

pub mod batch;
pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod pipeline;
pub mod processor;
pub mod retry;

#[cfg(test)]
mod test_support;

pub use batch::{load_video_list, parse_url_list, resolve_videos, BatchDriver, BatchSummary};
pub use config::WorkerConfig;
pub use error::{WorkerError, WorkerResult};
pub use logging::{init_tracing, VideoLogger};
pub use pipeline::{FramePipeline, PipelineOutput, PipelineSettings};
pub use processor::{check_catalog, VideoOutcome, VideoProcessor};
pub use retry::{retry_async, RetryConfig, RetryResult};
