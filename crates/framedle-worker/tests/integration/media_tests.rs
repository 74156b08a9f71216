//! FFmpeg and yt-dlp integration tests.

use std::process::Command;
use std::sync::Arc;
use std::time::Duration;

use framedle_media::{
    check_ffmpeg, decode_frame, FfmpegFrameGrabber, FrameGrabber, MediaError, MetadataProvider,
    YtDlpMetadataProvider,
};
use framedle_worker::{FramePipeline, PipelineSettings};

/// Render a short synthetic clip with FFmpeg's test source.
fn test_clip(dir: &std::path::Path) -> std::path::PathBuf {
    let path = dir.join("testsrc.mp4");
    let status = Command::new("ffmpeg")
        .args(["-y", "-v", "error", "-f", "lavfi", "-i"])
        .arg("testsrc=duration=10:size=640x360:rate=10")
        .args(["-pix_fmt", "yuv420p"])
        .arg(&path)
        .status()
        .expect("Failed to run ffmpeg");
    assert!(status.success());
    path
}

#[tokio::test]
#[ignore = "requires ffmpeg"]
async fn test_grab_frame_from_local_clip() {
    check_ffmpeg().expect("ffmpeg not installed");
    let dir = tempfile::tempdir().unwrap();
    let clip = test_clip(dir.path());

    let grabber = FfmpegFrameGrabber::new(dir.path(), 320, Duration::from_secs(30));
    let bytes = grabber
        .grab(clip.to_str().unwrap(), 4.5)
        .await
        .expect("Failed to grab frame");

    let image = decode_frame(&bytes).expect("Failed to decode frame");
    assert_eq!(image.width(), 320);
    assert_eq!(image.height(), 180);
}

#[tokio::test]
#[ignore = "requires ffmpeg"]
async fn test_grab_past_end_fails_with_timestamp() {
    check_ffmpeg().expect("ffmpeg not installed");
    let dir = tempfile::tempdir().unwrap();
    let clip = test_clip(dir.path());

    let grabber = FfmpegFrameGrabber::new(dir.path(), 320, Duration::from_secs(30));
    let err = grabber
        .grab(clip.to_str().unwrap(), 500.0)
        .await
        .unwrap_err();
    match err {
        MediaError::ExtractionFailed { timestamp, .. } => assert_eq!(timestamp, 500.0),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
#[ignore = "requires yt-dlp and network access"]
async fn test_fetch_metadata() {
    dotenvy::dotenv().ok();

    let provider = YtDlpMetadataProvider::new(Duration::from_secs(120));
    let record = provider
        .fetch("https://www.youtube.com/watch?v=dQw4w9WgXcQ")
        .await
        .expect("Failed to fetch metadata");

    assert_eq!(record.id.as_str(), "dQw4w9WgXcQ");
    assert!(record.duration > 60.0);
    assert!(!record.formats.is_empty());
    println!(
        "{} by {:?}, heatmap segments: {:?}",
        record.display_title(),
        record.channel,
        record.heatmap.as_ref().map(Vec::len)
    );
}

#[tokio::test]
#[ignore = "requires yt-dlp, ffmpeg and network access"]
async fn test_pipeline_against_live_video() {
    dotenvy::dotenv().ok();
    let dir = tempfile::tempdir().unwrap();

    let pipeline = FramePipeline::new(
        Arc::new(YtDlpMetadataProvider::new(Duration::from_secs(120))),
        Arc::new(FfmpegFrameGrabber::new(
            dir.path(),
            1280,
            Duration::from_secs(60),
        )),
        PipelineSettings {
            num_frames: 2,
            min_spacing_secs: 10.0,
            min_duration_secs: 1.0,
            frame_width: 1280,
        },
    );

    let output = pipeline
        .run("https://www.youtube.com/watch?v=dQw4w9WgXcQ")
        .await
        .expect("Pipeline failed");

    assert_eq!(output.moments.len(), 2);
    for moment in &output.moments {
        assert_eq!(moment.frame.width, 1280);
        assert_eq!(moment.variants.len(), framedle_models::VARIANT_TAXONOMY.len());
    }
}
