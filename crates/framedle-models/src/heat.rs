//! Heatmap segments and the moments selected from them.

use serde::{Deserialize, Serialize};

/// One interval of the popularity heatmap.
///
/// Field names match the heatmap entries emitted by yt-dlp, so the
/// provider payload deserializes directly into this type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeatSegment {
    /// Segment start (seconds)
    pub start_time: f64,
    /// Segment end (seconds)
    pub end_time: f64,
    /// Heat score in [0, 1]
    pub value: f64,
}

impl HeatSegment {
    pub fn new(start_time: f64, end_time: f64, value: f64) -> Self {
        Self {
            start_time,
            end_time,
            value,
        }
    }

    /// Midpoint of the segment.
    pub fn midpoint(&self) -> f64 {
        (self.start_time + self.end_time) / 2.0
    }
}

/// A selected peak timestamp destined for frame extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Moment {
    /// Frame timestamp (seconds), clamped away from the video edges
    pub timestamp: f64,
    /// Heat score of the source segment
    pub value: f64,
    /// Start of the source segment (seconds)
    pub start_time: f64,
    /// End of the source segment (seconds)
    pub end_time: f64,
    /// 1 = highest heat value among the selected moments
    pub rank: u32,
}
