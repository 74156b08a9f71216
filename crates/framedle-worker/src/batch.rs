//! Batch driver: runs many videos with bounded concurrency.
//!
//! Each video is independent; a failed video is recorded and the batch
//! moves on.

use std::future::Future;
use std::path::Path;
use std::time::{Duration, Instant};

use futures::stream::{self, StreamExt};
use serde::Deserialize;
use tracing::{error, info};

use crate::error::{WorkerError, WorkerResult};
use crate::retry::{retry_async, RetryConfig, RetryResult};

/// Longest error message kept per failed video.
const MAX_ERROR_CHARS: usize = 200;

#[derive(Debug, Deserialize)]
struct VideoListFile {
    #[serde(default)]
    videos: Vec<String>,
}

/// Split a comma-separated list of URLs or ids, dropping blanks.
pub fn parse_url_list(urls: &str) -> Vec<String> {
    urls.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Read `{"videos": [...]}` from `path`.
pub fn load_video_list(path: &Path) -> WorkerResult<Vec<String>> {
    if !path.exists() {
        return Err(WorkerError::configuration(format!(
            "video list {} not found",
            path.display()
        )));
    }

    let content = std::fs::read_to_string(path)?;
    let list: VideoListFile = serde_json::from_str(&content).map_err(|e| {
        WorkerError::configuration(format!("invalid video list {}: {}", path.display(), e))
    })?;

    Ok(list
        .videos
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect())
}

/// Resolve the batch input: explicit URLs win over the list file.
pub fn resolve_videos(urls: Option<&str>, list_path: &Path) -> WorkerResult<Vec<String>> {
    match urls {
        Some(urls) => Ok(parse_url_list(urls)),
        None => load_video_list(list_path),
    }
}

#[derive(Debug, Clone)]
pub struct VideoFailure {
    pub video: String,
    pub stage: &'static str,
    pub message: String,
    pub attempts: u32,
}

#[derive(Debug, Clone)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: Vec<String>,
    pub failed: Vec<VideoFailure>,
    pub elapsed: Duration,
}

impl BatchSummary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn log_summary(&self) {
        let secs = self.elapsed.as_secs_f64();
        let avg = if self.total > 0 {
            secs / self.total as f64
        } else {
            0.0
        };
        info!(
            total = self.total,
            succeeded = self.succeeded.len(),
            failed = self.failed.len(),
            "Batch complete: {} succeeded, {} failed in {:.1}s ({:.1}s/video)",
            self.succeeded.len(),
            self.failed.len(),
            secs,
            avg
        );
        for failure in &self.failed {
            error!(
                video = %failure.video,
                stage = failure.stage,
                attempts = failure.attempts,
                "Failed: {}",
                failure.message
            );
        }
    }
}

/// Runs a per-video job over a list of videos.
#[derive(Debug, Clone)]
pub struct BatchDriver {
    concurrency: usize,
    retry: RetryConfig,
}

impl BatchDriver {
    pub fn new(concurrency: usize, retry: RetryConfig) -> Self {
        Self {
            concurrency: concurrency.max(1),
            retry,
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Run `job` for every video, at most `concurrency` at a time.
    ///
    /// Results are reported in input order.
    pub async fn run<F, Fut, T>(&self, videos: Vec<String>, job: F) -> BatchSummary
    where
        F: Fn(String) -> Fut,
        Fut: Future<Output = WorkerResult<T>>,
    {
        let started = Instant::now();
        let total = videos.len();
        info!(
            "Processing {} videos (concurrency {}, retries {})",
            total, self.concurrency, self.retry.max_retries
        );

        let job = &job;
        let results: Vec<(String, RetryResult<T, WorkerError>)> = stream::iter(videos)
            .map(|video| async move {
                let result = retry_async(&self.retry, WorkerError::is_retryable, || {
                    job(video.clone())
                })
                .await;
                (video, result)
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut succeeded = Vec::new();
        let mut failed = Vec::new();
        for (video, result) in results {
            match result {
                RetryResult::Success { .. } => succeeded.push(video),
                RetryResult::Failed { error, attempts } => failed.push(VideoFailure {
                    video,
                    stage: error.stage(),
                    message: truncate_chars(&error.to_string(), MAX_ERROR_CHARS),
                    attempts,
                }),
            }
        }

        BatchSummary {
            total,
            succeeded,
            failed,
            elapsed: started.elapsed(),
        }
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn driver(concurrency: usize, retries: u32) -> BatchDriver {
        BatchDriver::new(
            concurrency,
            RetryConfig::new("video")
                .with_max_retries(retries)
                .with_base_delay(Duration::from_millis(1)),
        )
    }

    #[test]
    fn test_parse_url_list() {
        assert_eq!(
            parse_url_list(" a , ,https://youtu.be/b,  "),
            vec!["a".to_string(), "https://youtu.be/b".to_string()]
        );
        assert!(parse_url_list("").is_empty());
    }

    #[test]
    fn test_load_video_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("videos.json");
        std::fs::write(&path, r#"{"videos": ["abc", "  ", "https://youtu.be/x"]}"#).unwrap();

        let videos = tokio_test::assert_ok!(load_video_list(&path));
        assert_eq!(videos, vec!["abc", "https://youtu.be/x"]);
    }

    #[test]
    fn test_missing_or_invalid_video_list_is_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_video_list(&dir.path().join("nope.json")).unwrap_err();
        assert_eq!(err.stage(), "configuration");

        let path = dir.path().join("bad.json");
        std::fs::write(&path, "not json").unwrap();
        let err = load_video_list(&path).unwrap_err();
        assert_eq!(err.stage(), "configuration");
    }

    #[test]
    fn test_explicit_urls_win_over_list_file() {
        let videos = resolve_videos(Some("a,b"), Path::new("/does/not/exist.json")).unwrap();
        assert_eq!(videos, vec!["a", "b"]);
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars(&"é".repeat(300), MAX_ERROR_CHARS).chars().count(), 200);
    }

    #[tokio::test]
    async fn test_failures_do_not_stop_batch() {
        let videos = vec!["ok1".to_string(), "bad".to_string(), "ok2".to_string()];
        let summary = driver(2, 0)
            .run(videos, |video| async move {
                if video == "bad" {
                    Err(WorkerError::input("too short"))
                } else {
                    Ok(())
                }
            })
            .await;

        assert_eq!(summary.total, 3);
        assert_eq!(summary.succeeded, vec!["ok1", "ok2"]);
        assert_eq!(summary.failed.len(), 1);
        assert_eq!(summary.failed[0].video, "bad");
        assert_eq!(summary.failed[0].stage, "input");
        assert!(!summary.is_success());
        summary.log_summary();
    }

    #[tokio::test]
    async fn test_retryable_errors_are_retried() {
        let calls = AtomicUsize::new(0);
        let summary = driver(1, 2)
            .run(vec!["flaky".to_string()], |_| {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n == 0 {
                        Err(WorkerError::Metadata("HTTP 429".to_string()))
                    } else {
                        Ok(())
                    }
                }
            })
            .await;

        assert!(summary.is_success());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_input_errors_are_not_retried() {
        let calls = AtomicUsize::new(0);
        let summary = driver(1, 3)
            .run(vec!["short".to_string()], |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err::<(), _>(WorkerError::input("too short")) }
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(summary.failed[0].attempts, 1);
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let active = AtomicUsize::new(0);
        let peak = Mutex::new(0usize);
        let videos: Vec<String> = (0..8).map(|i| i.to_string()).collect();
        let (active, peak_ref) = (&active, &peak);

        let summary = driver(3, 0)
            .run(videos, move |_| async move {
                let peak = peak_ref;
                let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                {
                    let mut peak = peak.lock().unwrap();
                    *peak = (*peak).max(now);
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
                active.fetch_sub(1, Ordering::SeqCst);
                Ok(())
            })
            .await;

        assert_eq!(summary.succeeded.len(), 8);
        assert!(*peak.lock().unwrap() <= 3);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let summary = driver(4, 0)
            .run(Vec::new(), |_| async { Ok(()) })
            .await;
        assert_eq!(summary.total, 0);
        assert!(summary.is_success());
    }
}
