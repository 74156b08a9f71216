//! Extracted and published frame models.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::constants::{FRAMES_PREFIX, IMAGE_EXTENSION};
use crate::heat::Moment;
use crate::video::VideoId;

/// An encoded image ready for upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedImage {
    pub width: u32,
    pub height: u32,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl EncodedImage {
    /// Encoded size in bytes.
    pub fn byte_size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// A moment together with its grabbed frame and derived variants.
#[derive(Debug, Clone)]
pub struct ExtractedMoment {
    pub moment: Moment,
    /// Main frame image
    pub frame: EncodedImage,
    /// Variant name -> derived image, one entry per taxonomy name
    pub variants: BTreeMap<String, EncodedImage>,
}

impl ExtractedMoment {
    pub fn rank(&self) -> u32 {
        self.moment.rank
    }
}

/// Storage locations for one published moment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedFrame {
    /// Location of the main frame image
    pub main_location: String,
    /// Variant name -> location
    pub variant_locations: BTreeMap<String, String>,
}

/// Object key of the main frame image for `rank`.
pub fn frame_object_key(video_id: &VideoId, rank: u32) -> String {
    format!(
        "{}/{}/f{:02}.{}",
        FRAMES_PREFIX,
        video_id.as_str(),
        rank,
        IMAGE_EXTENSION
    )
}

/// Object key of a variant image for `rank`.
pub fn variant_object_key(video_id: &VideoId, rank: u32, variant: &str) -> String {
    format!(
        "{}/{}/f{:02}_{}.{}",
        FRAMES_PREFIX,
        video_id.as_str(),
        rank,
        variant,
        IMAGE_EXTENSION
    )
}
