//! In-memory fakes shared by the worker unit tests.

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Mutex;

use async_trait::async_trait;
use image::{ImageFormat, Rgb, RgbImage};

use framedle_media::{FrameGrabber, MediaError, MediaResult, MetadataProvider};
use framedle_models::{HeatSegment, MediaCandidate, VideoRecord};
use framedle_storage::{BlobSink, StorageError, StorageResult};

/// PNG-encoded gradient of the given size.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 7 % 256) as u8, (y * 11 % 256) as u8, 128])
    });
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

pub struct FakeMetadata {
    record: Option<VideoRecord>,
}

impl FakeMetadata {
    pub fn new(record: VideoRecord) -> Self {
        Self {
            record: Some(record),
        }
    }

    pub fn failing() -> Self {
        Self { record: None }
    }

    pub fn record(id: &str, duration: f64, heatmap: Option<Vec<HeatSegment>>) -> VideoRecord {
        let mut record = VideoRecord::new(id, duration);
        record.title = Some("Test video".to_string());
        record.channel = Some("Test channel".to_string());
        record.heatmap = heatmap;
        record.formats = vec![
            MediaCandidate {
                url: "https://cdn.example/360.mp4".to_string(),
                height: Some(360),
                has_video: true,
            },
            MediaCandidate {
                url: "https://cdn.example/720.mp4".to_string(),
                height: Some(720),
                has_video: true,
            },
        ];
        record
    }
}

#[async_trait]
impl MetadataProvider for FakeMetadata {
    async fn fetch(&self, _video_url: &str) -> MediaResult<VideoRecord> {
        self.record
            .clone()
            .ok_or_else(|| MediaError::metadata_failed("video unavailable"))
    }
}

/// Returns the same bytes for every grab and records each call.
pub struct FakeGrabber {
    bytes: Vec<u8>,
    calls: Mutex<Vec<(String, f64)>>,
}

impl FakeGrabber {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn timestamps(&self) -> Vec<f64> {
        self.calls.lock().unwrap().iter().map(|(_, t)| *t).collect()
    }

    pub fn urls(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(u, _)| u.clone()).collect()
    }
}

#[async_trait]
impl FrameGrabber for FakeGrabber {
    async fn grab(&self, media_url: &str, timestamp: f64) -> MediaResult<Vec<u8>> {
        self.calls
            .lock()
            .unwrap()
            .push((media_url.to_string(), timestamp));
        Ok(self.bytes.clone())
    }
}

/// Fails at one timestamp and succeeds everywhere else.
pub struct FailingGrabber {
    pub fail_at: f64,
}

#[async_trait]
impl FrameGrabber for FailingGrabber {
    async fn grab(&self, _media_url: &str, timestamp: f64) -> MediaResult<Vec<u8>> {
        if (timestamp - self.fail_at).abs() < 1e-9 {
            Err(MediaError::extraction_failed(timestamp, "connection reset"))
        } else {
            Ok(png_bytes(16, 9))
        }
    }
}

#[derive(Default)]
pub struct MemorySink {
    objects: Mutex<HashMap<String, (Vec<u8>, String)>>,
}

impl MemorySink {
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.lock().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl BlobSink for MemorySink {
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
        _cache_control: &str,
    ) -> StorageResult<String> {
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), (bytes, content_type.to_string()));
        Ok(format!("mem://{}", key))
    }
}

/// Sink whose every upload fails.
pub struct FailingSink;

#[async_trait]
impl BlobSink for FailingSink {
    async fn put(
        &self,
        key: &str,
        _bytes: Vec<u8>,
        _content_type: &str,
        _cache_control: &str,
    ) -> StorageResult<String> {
        Err(StorageError::upload_failed(key, "simulated outage"))
    }
}
