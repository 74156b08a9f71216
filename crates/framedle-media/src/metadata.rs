//! Video metadata lookup via yt-dlp.
//!
//! Only metadata is fetched; nothing is downloaded. Frames are later
//! grabbed straight from one of the reported direct media URLs.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info, warn};

use framedle_models::constants::PREFERRED_SOURCE_HEIGHT;
use framedle_models::{HeatSegment, MediaCandidate, VideoId, VideoRecord};

use crate::command::check_ytdlp;
use crate::error::{MediaError, MediaResult};

/// Resolves a video URL into metadata, heatmap and media URLs.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    async fn fetch(&self, video_url: &str) -> MediaResult<VideoRecord>;
}

/// yt-dlp backed metadata provider.
#[derive(Debug, Clone)]
pub struct YtDlpMetadataProvider {
    timeout: Duration,
}

impl YtDlpMetadataProvider {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    fn build_args(video_url: &str) -> Vec<String> {
        [
            "--dump-single-json",
            "--skip-download",
            "--no-playlist",
            "--no-warnings",
            "--extractor-args",
            "youtube:player_client=web",
            "--remote-components",
            "ejs:github",
            video_url,
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }
}

#[async_trait]
impl MetadataProvider for YtDlpMetadataProvider {
    async fn fetch(&self, video_url: &str) -> MediaResult<VideoRecord> {
        check_ytdlp()?;

        info!("Extracting metadata for: {}", video_url);

        let mut cmd = Command::new("yt-dlp");
        cmd.args(Self::build_args(video_url))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| {
                warn!("yt-dlp timed out after {}s", self.timeout.as_secs());
                MediaError::metadata_failed(format!(
                    "yt-dlp timed out after {} seconds",
                    self.timeout.as_secs()
                ))
            })??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            debug!("yt-dlp stderr: {}", stderr);
            return Err(MediaError::metadata_failed(format!(
                "yt-dlp failed: {}",
                stderr.lines().last().unwrap_or("Unknown error")
            )));
        }

        parse_info(&output.stdout)
    }
}

#[derive(Debug, Deserialize)]
struct YtDlpInfo {
    id: Option<String>,
    title: Option<String>,
    channel: Option<String>,
    uploader: Option<String>,
    channel_id: Option<String>,
    uploader_id: Option<String>,
    categories: Option<Vec<String>>,
    duration: Option<f64>,
    view_count: Option<u64>,
    channel_follower_count: Option<u64>,
    upload_date: Option<String>,
    heatmap: Option<Vec<HeatSegment>>,
    formats: Option<Vec<YtDlpFormat>>,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct YtDlpFormat {
    url: Option<String>,
    height: Option<u32>,
    vcodec: Option<String>,
}

/// Parse the `--dump-single-json` payload into a [`VideoRecord`].
pub fn parse_info(json: &[u8]) -> MediaResult<VideoRecord> {
    let info: YtDlpInfo = serde_json::from_slice(json)
        .map_err(|e| MediaError::metadata_failed(format!("invalid yt-dlp output: {}", e)))?;

    let id = info
        .id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| MediaError::metadata_failed("video id missing from metadata"))?;
    let duration = info
        .duration
        .ok_or_else(|| MediaError::metadata_failed("duration missing from metadata"))?;

    let upload_date = info
        .upload_date
        .as_deref()
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y%m%d").ok());

    // An empty heatmap is the same as none at all.
    let heatmap = info.heatmap.filter(|h| !h.is_empty());

    let formats = info
        .formats
        .unwrap_or_default()
        .into_iter()
        .filter_map(|f| {
            let url = f.url?;
            Some(MediaCandidate {
                url,
                height: f.height,
                has_video: f.vcodec.as_deref().is_some_and(|v| v != "none"),
            })
        })
        .collect();

    Ok(VideoRecord {
        id: VideoId::from(id),
        title: info.title,
        channel: info.channel.or(info.uploader),
        channel_id: info.channel_id.or(info.uploader_id),
        category: info.categories.and_then(|c| c.into_iter().next()),
        duration,
        view_count: info.view_count,
        subscriber_count: info.channel_follower_count,
        upload_date,
        heatmap,
        formats,
        direct_url: info.url,
    })
}

/// Pick the video stream closest to 720p, falling back to the top-level URL.
///
/// On equal distance the earlier format wins.
pub fn choose_media_url(record: &VideoRecord) -> MediaResult<String> {
    let target = PREFERRED_SOURCE_HEIGHT as i64;
    let mut best: Option<&MediaCandidate> = None;

    for candidate in record.formats.iter().filter(|c| c.has_video) {
        let distance = (candidate.height.unwrap_or(0) as i64 - target).abs();
        let better = match best {
            None => true,
            Some(b) => distance < (b.height.unwrap_or(0) as i64 - target).abs(),
        };
        if better {
            best = Some(candidate);
        }
    }

    if let Some(best) = best {
        return Ok(best.url.clone());
    }

    record
        .direct_url
        .clone()
        .ok_or_else(|| MediaError::metadata_failed("No suitable video URL found"))
}
