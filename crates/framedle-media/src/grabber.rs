//! Single-frame grabbing.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, info};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};

/// Grabs one still frame from a media URL.
#[async_trait]
pub trait FrameGrabber: Send + Sync {
    /// Returns the encoded raster bytes of the frame at `timestamp`.
    ///
    /// Must give up within a bounded time; failures map to
    /// [`MediaError::ExtractionFailed`].
    async fn grab(&self, media_url: &str, timestamp: f64) -> MediaResult<Vec<u8>>;
}

/// FFmpeg-backed grabber that seeks into the stream and writes a PNG.
#[derive(Debug)]
pub struct FfmpegFrameGrabber {
    work_dir: PathBuf,
    frame_width: u32,
    timeout: Duration,
    counter: AtomicU64,
}

impl FfmpegFrameGrabber {
    pub fn new(work_dir: impl Into<PathBuf>, frame_width: u32, timeout: Duration) -> Self {
        Self {
            work_dir: work_dir.into(),
            frame_width,
            timeout,
            counter: AtomicU64::new(0),
        }
    }

    fn scratch_path(&self, timestamp: f64) -> PathBuf {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        self.work_dir.join(format!(
            "grab_{}_{}_{}.png",
            std::process::id(),
            n,
            (timestamp * 1000.0).round() as i64
        ))
    }

    /// Build the FFmpeg invocation for one grab.
    pub fn build_command(&self, media_url: &str, timestamp: f64, output: &std::path::Path) -> FfmpegCommand {
        FfmpegCommand::new(media_url, output)
            .seek(timestamp)
            .single_frame()
            .video_filter(format!("scale={}:-1", self.frame_width))
    }
}

#[async_trait]
impl FrameGrabber for FfmpegFrameGrabber {
    async fn grab(&self, media_url: &str, timestamp: f64) -> MediaResult<Vec<u8>> {
        tokio::fs::create_dir_all(&self.work_dir)
            .await
            .map_err(|e| MediaError::extraction_failed(timestamp, e.to_string()))?;

        let output = self.scratch_path(timestamp);
        let cmd = self.build_command(media_url, timestamp, &output);

        debug!("Grabbing frame at {:.3}s -> {}", timestamp, output.display());

        let runner = FfmpegRunner::new().with_timeout(self.timeout);
        let result = runner.run(&cmd).await;

        let bytes = match result {
            Ok(()) => tokio::fs::read(&output).await.map_err(|e| {
                MediaError::extraction_failed(timestamp, format!("frame not written: {}", e))
            }),
            Err(e) => Err(MediaError::extraction_failed(timestamp, e.diagnostic())),
        };

        // Best effort; the scratch directory is removed with the job anyway.
        let _ = tokio::fs::remove_file(&output).await;

        let bytes = bytes?;
        if bytes.is_empty() {
            return Err(MediaError::extraction_failed(timestamp, "frame output is empty"));
        }

        info!("Grabbed frame at {:.1}s ({} bytes)", timestamp, bytes.len());
        Ok(bytes)
    }
}
