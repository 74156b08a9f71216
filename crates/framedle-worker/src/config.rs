//! Worker configuration.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use framedle_models::constants::{
    FRAME_WIDTH, GRAB_TIMEOUT_SECS, MIN_SPACING_SECS, MIN_VIDEO_DURATION_SECS, NUM_FRAMES,
};

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Number of peak moments to extract per video
    pub num_frames: usize,
    /// Minimum distance between selected timestamps (seconds)
    pub min_spacing_secs: f64,
    /// Width of extracted frames and of upscaled variants
    pub frame_width: u32,
    /// Timeout for a single frame grab
    pub grab_timeout: Duration,
    /// Timeout for one metadata lookup
    pub metadata_timeout: Duration,
    /// Videos shorter than this are rejected
    pub min_duration_secs: f64,
    /// Work directory for scratch files
    pub work_dir: PathBuf,
    /// Videos processed concurrently by the batch driver
    pub max_concurrent_videos: usize,
    /// Batch driver retries per video (0 = no retries)
    pub max_retries: u32,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            num_frames: NUM_FRAMES,
            min_spacing_secs: MIN_SPACING_SECS,
            frame_width: FRAME_WIDTH,
            grab_timeout: Duration::from_secs(GRAB_TIMEOUT_SECS),
            metadata_timeout: Duration::from_secs(120),
            min_duration_secs: MIN_VIDEO_DURATION_SECS,
            work_dir: std::env::temp_dir().join("framedle"),
            max_concurrent_videos: 1,
            max_retries: 0,
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        Self {
            num_frames: parsed(&lookup, "FRAMEDLE_NUM_FRAMES").unwrap_or(defaults.num_frames),
            min_spacing_secs: parsed(&lookup, "FRAMEDLE_MIN_SPACING_SECS")
                .unwrap_or(defaults.min_spacing_secs),
            frame_width: parsed(&lookup, "FRAMEDLE_FRAME_WIDTH")
                .filter(|w: &u32| *w > 0)
                .unwrap_or(defaults.frame_width),
            grab_timeout: parsed(&lookup, "FRAMEDLE_GRAB_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.grab_timeout),
            metadata_timeout: parsed(&lookup, "FRAMEDLE_METADATA_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.metadata_timeout),
            min_duration_secs: parsed(&lookup, "FRAMEDLE_MIN_DURATION_SECS")
                .unwrap_or(defaults.min_duration_secs),
            work_dir: lookup("FRAMEDLE_WORK_DIR")
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.work_dir),
            max_concurrent_videos: parsed(&lookup, "FRAMEDLE_MAX_CONCURRENT_VIDEOS")
                .filter(|n: &usize| *n > 0)
                .unwrap_or(defaults.max_concurrent_videos),
            max_retries: parsed(&lookup, "FRAMEDLE_MAX_RETRIES").unwrap_or(defaults.max_retries),
        }
    }
}

fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|s| s.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> WorkerConfig {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        WorkerConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let c = config(&[]);
        assert_eq!(c.num_frames, 6);
        assert_eq!(c.min_spacing_secs, 10.0);
        assert_eq!(c.frame_width, 1280);
        assert_eq!(c.grab_timeout, Duration::from_secs(60));
        assert_eq!(c.min_duration_secs, 1.0);
        assert_eq!(c.max_concurrent_videos, 1);
        assert_eq!(c.max_retries, 0);
    }

    #[test]
    fn test_overrides_and_invalid_values() {
        let c = config(&[
            ("FRAMEDLE_NUM_FRAMES", "4"),
            ("FRAMEDLE_MIN_SPACING_SECS", "2.5"),
            ("FRAMEDLE_FRAME_WIDTH", "0"),
            ("FRAMEDLE_GRAB_TIMEOUT_SECS", "15"),
            ("FRAMEDLE_WORK_DIR", "/var/tmp/frames"),
            ("FRAMEDLE_MAX_CONCURRENT_VIDEOS", "not-a-number"),
            ("FRAMEDLE_MAX_RETRIES", " 2 "),
        ]);
        assert_eq!(c.num_frames, 4);
        assert_eq!(c.min_spacing_secs, 2.5);
        assert_eq!(c.frame_width, 1280);
        assert_eq!(c.grab_timeout, Duration::from_secs(15));
        assert_eq!(c.work_dir, PathBuf::from("/var/tmp/frames"));
        assert_eq!(c.max_concurrent_videos, 1);
        assert_eq!(c.max_retries, 2);
    }
}
