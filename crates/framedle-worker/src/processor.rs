//! End-to-end processing of one video.
//!
//! Runs the frame pipeline, publishes the results and replaces the catalog
//! rows. A video either lands completely in the catalog or not at all.

use std::sync::Arc;
use std::time::Instant;

use tracing::{info, Instrument};

use framedle_catalog::{CatalogConfig, CatalogWriter};
use framedle_media::{FfmpegFrameGrabber, YtDlpMetadataProvider};
use framedle_models::{extract_youtube_id, normalize_video_url, VideoId, YoutubeIdError};
use framedle_storage::{BlobSink, Publisher, R2Client};

use crate::config::WorkerConfig;
use crate::error::{WorkerError, WorkerResult};
use crate::logging::VideoLogger;
use crate::metrics::record_video;
use crate::pipeline::{FramePipeline, PipelineSettings};

/// Connect to the catalog and create its schema.
///
/// Returns `Ok(false)` without touching anything when no database is
/// configured.
pub async fn check_catalog(config: &CatalogConfig) -> WorkerResult<bool> {
    if !config.is_configured() {
        return Ok(false);
    }
    let catalog = CatalogWriter::from_config(config).await?;
    catalog.migrate().await?;
    Ok(true)
}

/// Summary of a successfully processed video.
#[derive(Debug, Clone)]
pub struct VideoOutcome {
    pub video_id: VideoId,
    pub title: String,
    pub frames: usize,
    /// False when no blob sink was configured
    pub published: bool,
    pub synthetic_heatmap: bool,
    pub elapsed_secs: f64,
}

pub struct VideoProcessor {
    pipeline: FramePipeline,
    publisher: Publisher,
    catalog: CatalogWriter,
}

impl VideoProcessor {
    pub fn new(pipeline: FramePipeline, publisher: Publisher, catalog: CatalogWriter) -> Self {
        Self {
            pipeline,
            publisher,
            catalog,
        }
    }

    /// Wire up the production collaborators: yt-dlp, FFmpeg, R2 and the
    /// catalog database. The catalog schema is created when a database is
    /// configured.
    pub async fn from_config(
        config: &WorkerConfig,
        catalog_config: &CatalogConfig,
    ) -> WorkerResult<Self> {
        let metadata = Arc::new(YtDlpMetadataProvider::new(config.metadata_timeout));
        let grabber = Arc::new(FfmpegFrameGrabber::new(
            config.work_dir.clone(),
            config.frame_width,
            config.grab_timeout,
        ));
        let pipeline = FramePipeline::new(metadata, grabber, PipelineSettings::from(config));

        let sink = R2Client::from_env_optional().map(|client| {
            info!("Publishing frames to bucket {}", client.bucket());
            Arc::new(client) as Arc<dyn BlobSink>
        });
        let publisher = Publisher::new(sink);

        let catalog = CatalogWriter::from_config(catalog_config).await?;
        if catalog.is_configured() {
            catalog.migrate().await?;
        }

        Ok(Self::new(pipeline, publisher, catalog))
    }

    pub fn catalog(&self) -> &CatalogWriter {
        &self.catalog
    }

    /// Process one video given as a URL or bare id.
    pub async fn process(&self, input: &str) -> WorkerResult<VideoOutcome> {
        let url = normalize_video_url(input);
        let logger = VideoLogger::from_string(&url, "extract");
        let span = logger.create_span();

        logger.log_start(&url);
        let started = Instant::now();

        let result = self.process_inner(&url, started).instrument(span).await;

        match &result {
            Ok(outcome) => {
                record_video(true, outcome.frames);
                logger.log_completion(&format!(
                    "{} -> {} frames in {:.1}s",
                    outcome.video_id, outcome.frames, outcome.elapsed_secs
                ));
            }
            Err(e) => {
                record_video(false, 0);
                logger.log_error(e.stage(), &e.to_string());
            }
        }

        result
    }

    async fn process_inner(&self, url: &str, started: Instant) -> WorkerResult<VideoOutcome> {
        // Nothing would be persisted; don't spend minutes on extraction.
        if !self.catalog.is_configured() {
            return Err(WorkerError::configuration(
                "DATABASE_URL is not set, the catalog is unavailable",
            ));
        }

        // Other hosts go straight to the metadata provider.
        if let Err(e @ (YoutubeIdError::InvalidVideoId | YoutubeIdError::VideoIdNotFound)) =
            extract_youtube_id(url)
        {
            return Err(WorkerError::input(format!("{}: {}", e, url)));
        }

        let output = self.pipeline.run(url).await?;

        let published = self
            .publisher
            .publish(&output.video.id, &output.moments)
            .await?;

        self.catalog
            .replace(&output.video, &output.moments, &output.heatmap, &published)
            .await?;

        Ok(VideoOutcome {
            video_id: output.video.id.clone(),
            title: output.video.display_title().to_string(),
            frames: output.moments.len(),
            published: self.publisher.is_configured(),
            synthetic_heatmap: output.synthetic_heatmap,
            elapsed_secs: started.elapsed().as_secs_f64(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{
        png_bytes, FailingGrabber, FailingSink, FakeGrabber, FakeMetadata, MemorySink,
    };
    use framedle_media::FrameGrabber;
    use framedle_models::HeatSegment;

    const VIDEO_ID: &str = "dQw4w9WgXcQ";

    fn pipeline() -> FramePipeline {
        pipeline_with(Arc::new(FakeGrabber::new(png_bytes(48, 27))))
    }

    fn pipeline_with(grabber: Arc<dyn FrameGrabber>) -> FramePipeline {
        let heatmap = (0..6)
            .map(|i| {
                let i = i as f64;
                HeatSegment::new(i * 20.0, (i + 1.0) * 20.0, 0.9 - i * 0.1)
            })
            .collect();
        let record = FakeMetadata::record(VIDEO_ID, 120.0, Some(heatmap));
        FramePipeline::new(
            Arc::new(FakeMetadata::new(record)),
            grabber,
            PipelineSettings {
                num_frames: 2,
                min_spacing_secs: 10.0,
                min_duration_secs: 1.0,
                frame_width: 48,
            },
        )
    }

    async fn sqlite_catalog() -> (tempfile::TempDir, CatalogWriter) {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("catalog.db").display());
        let catalog = CatalogWriter::connect(&url, 1).await.unwrap();
        catalog.migrate().await.unwrap();
        (dir, catalog)
    }

    #[tokio::test]
    async fn test_process_publishes_and_catalogs() {
        let (_dir, catalog) = sqlite_catalog().await;
        let sink = Arc::new(MemorySink::default());
        let processor = VideoProcessor::new(
            pipeline(),
            Publisher::new(Some(sink.clone() as Arc<dyn BlobSink>)),
            catalog,
        );

        let outcome = processor.process(VIDEO_ID).await.unwrap();
        assert_eq!(outcome.video_id.as_str(), VIDEO_ID);
        assert_eq!(outcome.frames, 2);
        assert!(outcome.published);
        assert!(!outcome.synthetic_heatmap);

        let keys = sink.keys();
        assert!(keys.contains(&format!("frames/{}/f01.webp", VIDEO_ID)));
        assert!(keys.contains(&format!("frames/{}/f02.webp", VIDEO_ID)));

        let id = VideoId::from(VIDEO_ID);
        let frames = processor.catalog().list_frames(&id).await.unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].rank, 1);
        assert!(frames[0].main_location.starts_with("mem://"));
        assert!(!frames[0].variant_locations.is_empty());
    }

    #[tokio::test]
    async fn test_reprocessing_replaces_rows() {
        let (_dir, catalog) = sqlite_catalog().await;
        let processor = VideoProcessor::new(pipeline(), Publisher::new(None), catalog);

        processor.process(VIDEO_ID).await.unwrap();
        let outcome = processor.process(VIDEO_ID).await.unwrap();
        assert!(!outcome.published);

        let id = VideoId::from(VIDEO_ID);
        assert_eq!(processor.catalog().count_videos(&id).await.unwrap(), 1);
        let frames = processor.catalog().list_frames(&id).await.unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].main_location, format!("frames/{}/f01.webp", VIDEO_ID));
        assert!(frames[0].variant_locations.is_empty());
    }

    #[tokio::test]
    async fn test_missing_catalog_fails_before_extraction() {
        let grabber = Arc::new(FakeGrabber::new(png_bytes(8, 8)));
        let record = FakeMetadata::record(VIDEO_ID, 60.0, None);
        let pipeline = FramePipeline::new(
            Arc::new(FakeMetadata::new(record)),
            grabber.clone(),
            PipelineSettings {
                num_frames: 2,
                min_spacing_secs: 5.0,
                min_duration_secs: 1.0,
                frame_width: 8,
            },
        );
        let processor =
            VideoProcessor::new(pipeline, Publisher::new(None), CatalogWriter::unconfigured());

        let err = processor.process(VIDEO_ID).await.unwrap_err();
        assert_eq!(err.stage(), "configuration");
        assert!(grabber.timestamps().is_empty());
    }

    #[tokio::test]
    async fn test_extraction_failure_leaves_catalog_untouched() {
        let (_dir, catalog) = sqlite_catalog().await;
        let sink = Arc::new(MemorySink::default());
        // Midpoints 10s and 30s are selected; the second grab fails.
        let processor = VideoProcessor::new(
            pipeline_with(Arc::new(FailingGrabber { fail_at: 30.0 })),
            Publisher::new(Some(sink.clone() as Arc<dyn BlobSink>)),
            catalog,
        );

        let err = processor.process(VIDEO_ID).await.unwrap_err();
        assert_eq!(err.stage(), "extraction");

        let id = VideoId::from(VIDEO_ID);
        assert_eq!(processor.catalog().count_videos(&id).await.unwrap(), 0);
        assert!(processor.catalog().list_frames(&id).await.unwrap().is_empty());
        assert!(sink.keys().is_empty());
    }

    #[tokio::test]
    async fn test_publish_failure_leaves_catalog_untouched() {
        let (_dir, catalog) = sqlite_catalog().await;
        let processor = VideoProcessor::new(
            pipeline(),
            Publisher::new(Some(Arc::new(FailingSink) as Arc<dyn BlobSink>)),
            catalog,
        );

        let err = processor.process(VIDEO_ID).await.unwrap_err();
        assert_eq!(err.stage(), "publish");

        let id = VideoId::from(VIDEO_ID);
        assert_eq!(processor.catalog().count_videos(&id).await.unwrap(), 0);
        assert!(processor.catalog().list_frames(&id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_youtube_id_is_rejected_before_metadata() {
        let (_dir, catalog) = sqlite_catalog().await;
        let grabber = Arc::new(FakeGrabber::new(png_bytes(8, 8)));
        let processor =
            VideoProcessor::new(pipeline_with(grabber.clone()), Publisher::new(None), catalog);

        let err = processor.process("abc").await.unwrap_err();
        assert_eq!(err.stage(), "input");
        assert!(err.to_string().contains("invalid format"));

        let err = processor
            .process("https://www.youtube.com/channel/UC123")
            .await
            .unwrap_err();
        assert_eq!(err.stage(), "input");
        assert!(grabber.timestamps().is_empty());
    }

    #[tokio::test]
    async fn test_check_catalog_skips_when_unconfigured() {
        let config = CatalogConfig {
            database_url: None,
            max_connections: 1,
        };
        assert!(!check_catalog(&config).await.unwrap());
    }

    #[tokio::test]
    async fn test_check_catalog_migrates_configured_database() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("check.db").display());
        assert!(check_catalog(&CatalogConfig::new(url.clone())).await.unwrap());

        let catalog = CatalogWriter::connect(&url, 1).await.unwrap();
        let id = VideoId::from(VIDEO_ID);
        assert_eq!(catalog.count_videos(&id).await.unwrap(), 0);
    }
}
