#![deny(unreachable_patterns)]
//! Media side of the frame pipeline.
//!
//! This crate provides:
//! - Peak selection over a video heatmap
//! - Deterministic image variant generation
//! - FFmpeg command building with bounded execution
//! - Frame grabbing via FFmpeg
//! - Video metadata lookup via yt-dlp

pub mod command;
pub mod encode;
pub mod error;
pub mod grabber;
pub mod metadata;
pub mod peaks;
pub mod variants;

pub use command::{check_ffmpeg, check_ytdlp, FfmpegCommand, FfmpegRunner};
pub use encode::{decode_frame, encode_webp};
pub use error::{MediaError, MediaResult};
pub use grabber::{FfmpegFrameGrabber, FrameGrabber};
pub use metadata::{choose_media_url, parse_info, MetadataProvider, YtDlpMetadataProvider};
pub use peaks::{select_peaks, synthetic_heatmap};
pub use variants::VariantGenerator;
