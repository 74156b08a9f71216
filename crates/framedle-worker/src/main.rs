//! Frame extraction worker binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{error, info, warn};

use framedle_catalog::CatalogConfig;
use framedle_worker::{
    init_tracing, resolve_videos, BatchDriver, RetryConfig, VideoProcessor, WorkerConfig,
};

#[derive(Debug, Parser)]
#[command(name = "framedle-worker", version, about = "Extract peak-moment frames from videos")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Process a single video URL or id
    Extract {
        #[arg(env = "VIDEO_URL")]
        video: String,
    },
    /// Process a list of videos
    Batch {
        /// Comma-separated URLs or ids; overrides --config
        #[arg(long)]
        urls: Option<String>,
        /// JSON file of the form {"videos": [...]}
        #[arg(long, default_value = "videos.json")]
        config: PathBuf,
        /// Videos processed at the same time
        #[arg(long)]
        concurrency: Option<usize>,
        /// Retries per failed video
        #[arg(long)]
        retries: Option<u32>,
    },
}

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for TLS/HTTPS)
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        eprintln!("rustls crypto provider already installed");
    }

    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    let config = WorkerConfig::from_env();
    info!("Worker config: {:?}", config);

    if let Err(e) = tokio::fs::create_dir_all(&config.work_dir).await {
        error!("Failed to create work dir {}: {}", config.work_dir.display(), e);
        std::process::exit(1);
    }

    let processor = match VideoProcessor::from_config(&config, &CatalogConfig::from_env()).await {
        Ok(p) => p,
        Err(e) => {
            error!("Failed to create video processor: {}", e);
            std::process::exit(1);
        }
    };

    let ok = tokio::select! {
        ok = run(cli.command, &config, &processor) => ok,
        _ = tokio::signal::ctrl_c() => {
            warn!("Received shutdown signal, aborting");
            false
        }
    };

    if !ok {
        std::process::exit(1);
    }
    info!("Worker finished");
}

async fn run(command: Command, config: &WorkerConfig, processor: &VideoProcessor) -> bool {
    match command {
        Command::Extract { video } => match processor.process(&video).await {
            Ok(outcome) => {
                info!(
                    "{} ({}): {} frames{}",
                    outcome.video_id,
                    outcome.title,
                    outcome.frames,
                    if outcome.published { "" } else { ", not uploaded" }
                );
                true
            }
            Err(e) => {
                error!(stage = e.stage(), "Extraction failed: {}", e);
                false
            }
        },
        Command::Batch {
            urls,
            config: list_path,
            concurrency,
            retries,
        } => {
            let videos = match resolve_videos(urls.as_deref(), &list_path) {
                Ok(videos) => videos,
                Err(e) => {
                    error!("Failed to load video list: {}", e);
                    return false;
                }
            };
            if videos.is_empty() {
                warn!("No videos to process");
                return true;
            }

            let retry = RetryConfig::new("video")
                .with_max_retries(retries.unwrap_or(config.max_retries));
            let driver =
                BatchDriver::new(concurrency.unwrap_or(config.max_concurrent_videos), retry);

            let summary = driver
                .run(videos, move |video| async move { processor.process(&video).await })
                .await;
            summary.log_summary();
            summary.is_success()
        }
    }
}
