//! Deployment self-check.
//!
//! Verifies the work dir, FFmpeg, yt-dlp, the catalog database and the R2
//! bucket. Optional services that are not configured are skipped.

use std::path::Path;

use framedle_catalog::CatalogConfig;
use framedle_media::{check_ffmpeg, check_ytdlp};
use framedle_storage::R2Client;
use framedle_worker::{check_catalog, WorkerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        eprintln!("rustls crypto provider already installed");
    }
    dotenvy::dotenv().ok();

    let config = WorkerConfig::from_env();

    println!(
        "framedle-selfcheck: starting with work_dir={}",
        config.work_dir.display()
    );
    ensure_workdir(&config.work_dir).await?;

    let ffmpeg = check_ffmpeg()?;
    println!("framedle-selfcheck: ffmpeg at {}", ffmpeg.display());
    let ytdlp = check_ytdlp()?;
    println!("framedle-selfcheck: yt-dlp at {}", ytdlp.display());

    if check_catalog(&CatalogConfig::from_env()).await? {
        println!("framedle-selfcheck: catalog reachable");
    } else {
        println!("framedle-selfcheck: catalog not configured, skipping");
    }

    match R2Client::from_env_optional() {
        Some(client) => {
            client.check_connectivity().await?;
            println!("framedle-selfcheck: bucket {} reachable", client.bucket());
        }
        None => println!("framedle-selfcheck: R2 not configured, frames will not be uploaded"),
    }

    println!("framedle-selfcheck: ok");
    Ok(())
}

/// Create the work dir and prove it is writable.
async fn ensure_workdir(path: &Path) -> anyhow::Result<()> {
    tokio::fs::create_dir_all(path).await?;
    let marker = path.join(".selfcheck");
    tokio::fs::write(&marker, b"ok").await?;
    tokio::fs::remove_file(&marker).await?;
    Ok(())
}
