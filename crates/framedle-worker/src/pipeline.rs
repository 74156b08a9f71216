//! Per-video frame pipeline.
//!
//! metadata -> peak selection -> (per moment) grab, encode, variants.
//! Moments are processed one after another and any failure aborts the whole
//! video; there is never a partial result.

use std::sync::Arc;

use tracing::info;

use framedle_media::{
    choose_media_url, decode_frame, encode_webp, select_peaks, synthetic_heatmap, FrameGrabber,
    MediaError, MetadataProvider, VariantGenerator,
};
use framedle_models::{ExtractedMoment, HeatSegment, Moment, VideoRecord, VARIANT_TAXONOMY};

use crate::config::WorkerConfig;
use crate::error::{WorkerError, WorkerResult};
use crate::logging::VideoLogger;

/// Selection and rendering parameters for one pipeline.
#[derive(Debug, Clone, Copy)]
pub struct PipelineSettings {
    pub num_frames: usize,
    pub min_spacing_secs: f64,
    pub min_duration_secs: f64,
    pub frame_width: u32,
}

impl From<&WorkerConfig> for PipelineSettings {
    fn from(config: &WorkerConfig) -> Self {
        Self {
            num_frames: config.num_frames,
            min_spacing_secs: config.min_spacing_secs,
            min_duration_secs: config.min_duration_secs,
            frame_width: config.frame_width,
        }
    }
}

/// Everything the pipeline produced for one video.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub video: VideoRecord,
    /// Heatmap used for selection (real or synthetic)
    pub heatmap: Vec<HeatSegment>,
    pub synthetic_heatmap: bool,
    /// Ordered by rank
    pub moments: Vec<ExtractedMoment>,
}

pub struct FramePipeline {
    metadata: Arc<dyn MetadataProvider>,
    grabber: Arc<dyn FrameGrabber>,
    generator: VariantGenerator,
    settings: PipelineSettings,
}

impl FramePipeline {
    pub fn new(
        metadata: Arc<dyn MetadataProvider>,
        grabber: Arc<dyn FrameGrabber>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            metadata,
            grabber,
            generator: VariantGenerator::new(settings.frame_width),
            settings,
        }
    }

    /// Run metadata lookup, selection and extraction for one video URL.
    pub async fn run(&self, video_url: &str) -> WorkerResult<PipelineOutput> {
        let video = self.metadata.fetch(video_url).await?;
        let logger = VideoLogger::new(&video.id, "pipeline");

        logger.log_progress(&format!(
            "{} ({:.0}s) by {}",
            video.display_title(),
            video.duration,
            video.channel.as_deref().unwrap_or("Unknown")
        ));

        // `!(a >= b)` also rejects a NaN duration.
        if !(video.duration >= self.settings.min_duration_secs) {
            return Err(WorkerError::input(format!(
                "video duration {:.2}s is shorter than the minimum {:.2}s",
                video.duration, self.settings.min_duration_secs
            )));
        }

        let (heatmap, synthetic) = match &video.heatmap {
            Some(heatmap) => (heatmap.clone(), false),
            None => {
                logger.log_warning("No heatmap data available, using evenly spaced moments");
                (
                    synthetic_heatmap(video.duration, self.settings.num_frames),
                    true,
                )
            }
        };
        logger.log_progress(&format!("Heatmap segments: {}", heatmap.len()));

        let moments = select_peaks(
            &heatmap,
            video.duration,
            self.settings.num_frames,
            self.settings.min_spacing_secs,
        )?;

        let media_url = choose_media_url(&video)?;

        let mut extracted = Vec::with_capacity(moments.len());
        for moment in moments {
            let item = self.extract_moment(&media_url, moment).await?;
            info!(
                video_id = %video.id,
                rank = item.rank(),
                "Frame rank {}: {}x{}, {} bytes, {} variants",
                item.rank(),
                item.frame.width,
                item.frame.height,
                item.frame.byte_size(),
                item.variants.len()
            );
            extracted.push(item);
        }

        Ok(PipelineOutput {
            video,
            heatmap,
            synthetic_heatmap: synthetic,
            moments: extracted,
        })
    }

    /// Grab the frame for `moment` and derive its variants.
    pub async fn extract_moment(
        &self,
        media_url: &str,
        moment: Moment,
    ) -> WorkerResult<ExtractedMoment> {
        let timestamp = moment.timestamp;

        let bytes = self
            .grabber
            .grab(media_url, timestamp)
            .await
            .map_err(|e| match e {
                MediaError::ExtractionFailed { .. } => WorkerError::from(e),
                other => WorkerError::extraction(timestamp, other.diagnostic()),
            })?;

        // Decoding and resampling are CPU bound.
        let generator = self.generator;
        let (frame, variants) = tokio::task::spawn_blocking(move || -> WorkerResult<_> {
            let image = decode_frame(&bytes)
                .map_err(|e| WorkerError::extraction(timestamp, e.to_string()))?;
            let frame = encode_webp(&image)?;
            let variants = generator.generate(&image, VARIANT_TAXONOMY)?;
            Ok((frame, variants))
        })
        .await
        .map_err(|e| WorkerError::Encoding(format!("image task failed: {}", e)))??;

        Ok(ExtractedMoment {
            moment,
            frame,
            variants,
        })
    }
}
