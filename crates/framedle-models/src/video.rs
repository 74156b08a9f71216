//! Video metadata models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::heat::HeatSegment;

/// Platform identifier of a video (e.g. the 11-character YouTube id).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(pub String);

impl VideoId {
    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for VideoId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for VideoId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A direct media URL offered by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaCandidate {
    pub url: String,
    /// Vertical resolution, when reported
    pub height: Option<u32>,
    /// False for audio-only streams
    pub has_video: bool,
}

/// Video metadata as reported by the metadata provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoRecord {
    pub id: VideoId,
    pub title: Option<String>,
    pub channel: Option<String>,
    pub channel_id: Option<String>,
    pub category: Option<String>,
    /// Duration in seconds
    pub duration: f64,
    pub view_count: Option<u64>,
    pub subscriber_count: Option<u64>,
    pub upload_date: Option<NaiveDate>,
    /// `None` when the platform reports no heatmap
    pub heatmap: Option<Vec<HeatSegment>>,
    /// Candidate direct media URLs
    #[serde(default)]
    pub formats: Vec<MediaCandidate>,
    /// Top-level direct URL, used when no format qualifies
    pub direct_url: Option<String>,
}

impl VideoRecord {
    /// Minimal record, mostly useful for tests and fixtures.
    pub fn new(id: impl Into<VideoId>, duration: f64) -> Self {
        Self {
            id: id.into(),
            title: None,
            channel: None,
            channel_id: None,
            category: None,
            duration,
            view_count: None,
            subscriber_count: None,
            upload_date: None,
            heatmap: None,
            formats: Vec::new(),
            direct_url: None,
        }
    }

    /// Title for log output.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("Unknown")
    }
}
