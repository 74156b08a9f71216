//! Pipeline metrics.

use metrics::counter;

/// Metric name constants for consistency.
pub mod names {
    /// Processed videos by status.
    pub const VIDEOS_TOTAL: &str = "pipeline_videos_total";

    /// Frames written to the catalog.
    pub const FRAMES_TOTAL: &str = "pipeline_frames_total";
}

/// Record one finished video run.
pub fn record_video(success: bool, frames: usize) {
    let status = if success { "success" } else { "error" };
    counter!(names::VIDEOS_TOTAL, "status" => status).increment(1);
    if success {
        counter!(names::FRAMES_TOTAL).increment(frames as u64);
    }
}
