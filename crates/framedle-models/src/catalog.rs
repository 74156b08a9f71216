//! Catalog rows.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::heat::HeatSegment;
use crate::video::VideoId;

/// One row of the `videos` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoCatalogEntry {
    pub video_id: VideoId,
    pub title: Option<String>,
    pub channel: Option<String>,
    pub channel_id: Option<String>,
    pub category: Option<String>,
    /// Whole seconds
    pub duration: i64,
    pub view_count: Option<i64>,
    pub subscriber_count: Option<i64>,
    pub upload_date: Option<NaiveDate>,
    /// Heatmap used for selection (real or synthetic)
    pub heatmap_raw: Vec<HeatSegment>,
    pub processed_at: DateTime<Utc>,
}

/// One row of the `frames` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameCatalogEntry {
    pub video_id: VideoId,
    pub rank: u32,
    pub timestamp_sec: f64,
    pub heat_value: f64,
    pub main_location: String,
    pub variant_locations: BTreeMap<String, String>,
    pub width: u32,
    pub height: u32,
    pub byte_size: u64,
}
