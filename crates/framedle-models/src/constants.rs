//! Pipeline constants.

/// Number of frames extracted per video.
pub const NUM_FRAMES: usize = 6;
/// Minimum distance between two selected moments (seconds).
pub const MIN_SPACING_SECS: f64 = 10.0;
/// Distance kept from both ends of the video when picking a timestamp (seconds).
pub const EDGE_MARGIN_SECS: f64 = 0.5;
/// Videos shorter than this are rejected before peak selection (seconds).
pub const MIN_VIDEO_DURATION_SECS: f64 = 1.0;

/// Standard frame width; grabbed frames and upscaled variants use it.
pub const FRAME_WIDTH: u32 = 1280;
/// Preferred source height when choosing among direct media URLs.
pub const PREFERRED_SOURCE_HEIGHT: u32 = 720;
/// Upper bound for a single frame grab (seconds).
pub const GRAB_TIMEOUT_SECS: u64 = 60;

/// Content type for every stored image.
pub const IMAGE_CONTENT_TYPE: &str = "image/webp";
/// Cache policy attached to every stored image.
pub const IMAGE_CACHE_CONTROL: &str = "public, max-age=86400";
/// File extension matching `IMAGE_CONTENT_TYPE`.
pub const IMAGE_EXTENSION: &str = "webp";
/// Object key prefix for frame images.
pub const FRAMES_PREFIX: &str = "frames";
/// Bucket used when `R2_BUCKET` is not set.
pub const DEFAULT_BUCKET: &str = "framedle-content";
