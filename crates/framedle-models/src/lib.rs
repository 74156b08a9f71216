//! Shared data models for the Framedle frame pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Heatmap segments and selected moments
//! - The fixed image variant taxonomy
//! - Video metadata as reported by the metadata provider
//! - Extracted/published frames and catalog rows
//! - YouTube URL normalization

pub mod catalog;
pub mod constants;
pub mod frame;
pub mod heat;
pub mod utils;
pub mod variant;
pub mod video;

// Re-export common types
pub use catalog::{FrameCatalogEntry, VideoCatalogEntry};
pub use frame::{frame_object_key, variant_object_key, EncodedImage, ExtractedMoment, PublishedFrame};
pub use heat::{HeatSegment, Moment};
pub use utils::{extract_youtube_id, normalize_video_url, YoutubeIdError, YoutubeIdResult};
pub use variant::{find_variant, Quadrant, VariantKind, VariantSpec, VARIANT_TAXONOMY};
pub use video::{MediaCandidate, VideoId, VideoRecord};
