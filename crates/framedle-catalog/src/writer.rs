//! Transactional catalog writer.

use std::collections::{BTreeMap, HashMap};
use std::time::Instant;

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::any::{AnyPoolOptions, AnyRow};
use sqlx::{AnyPool, Row};
use tracing::{debug, info, warn};

use framedle_models::{
    frame_object_key, ExtractedMoment, FrameCatalogEntry, HeatSegment, PublishedFrame,
    VideoCatalogEntry, VideoId, VideoRecord,
};

use crate::config::CatalogConfig;
use crate::error::{CatalogError, CatalogResult};
use crate::metrics::record_replace;
use crate::schema::SCHEMA;

const DATE_FORMAT: &str = "%Y-%m-%d";

const UPSERT_VIDEO: &str = r#"
    INSERT INTO videos (
        video_id, title, channel, channel_id, category,
        duration, view_count, subscriber_count,
        upload_date, heatmap_raw, processed_at
    ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
    ON CONFLICT (video_id) DO UPDATE SET
        title = excluded.title,
        channel = excluded.channel,
        channel_id = excluded.channel_id,
        category = excluded.category,
        duration = excluded.duration,
        view_count = excluded.view_count,
        subscriber_count = excluded.subscriber_count,
        upload_date = excluded.upload_date,
        heatmap_raw = excluded.heatmap_raw,
        processed_at = excluded.processed_at
"#;

const DELETE_FRAMES: &str = "DELETE FROM frames WHERE video_id = $1";

const INSERT_FRAME: &str = r#"
    INSERT INTO frames (
        video_id, rank, timestamp_sec, heat_value,
        main_location, variant_locations, width, height, byte_size
    ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
"#;

/// Writes and reads the `videos` / `frames` catalog.
#[derive(Debug, Clone)]
pub struct CatalogWriter {
    pool: Option<AnyPool>,
}

impl CatalogWriter {
    /// A writer without a database; every operation fails with
    /// [`CatalogError::NotConfigured`].
    pub fn unconfigured() -> Self {
        Self { pool: None }
    }

    /// Connect when a database URL is configured, otherwise return an
    /// unconfigured writer.
    pub async fn from_config(config: &CatalogConfig) -> CatalogResult<Self> {
        let Some(url) = config.connect_url() else {
            warn!("DATABASE_URL not set, catalog writes will fail");
            return Ok(Self::unconfigured());
        };
        Self::connect(&url, config.max_connections).await
    }

    /// Connect to `url` (PostgreSQL or SQLite).
    pub async fn connect(url: &str, max_connections: u32) -> CatalogResult<Self> {
        sqlx::any::install_default_drivers();

        let pool = AnyPoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect(url)
            .await?;

        info!("Connected to catalog database");
        Ok(Self { pool: Some(pool) })
    }

    pub fn is_configured(&self) -> bool {
        self.pool.is_some()
    }

    fn pool(&self) -> CatalogResult<&AnyPool> {
        self.pool.as_ref().ok_or(CatalogError::NotConfigured)
    }

    /// Create the catalog tables if they do not exist.
    pub async fn migrate(&self) -> CatalogResult<()> {
        let pool = self.pool()?;
        for statement in SCHEMA {
            sqlx::query(statement).execute(pool).await?;
        }
        debug!("Catalog schema ready");
        Ok(())
    }

    /// Atomically replace everything stored for one video.
    ///
    /// Upserts the video row, deletes its frame rows and inserts one row
    /// per moment, all in one transaction. On any error the transaction is
    /// rolled back and the previous catalog state is left untouched.
    /// Moments missing from `published` get the conventional object key and
    /// no variant locations.
    pub async fn replace(
        &self,
        video: &VideoRecord,
        moments: &[ExtractedMoment],
        heatmap: &[HeatSegment],
        published: &HashMap<u32, PublishedFrame>,
    ) -> CatalogResult<()> {
        let pool = self.pool()?;

        let started = Instant::now();
        let video_entry = video_entry(video, heatmap, Utc::now());
        let frame_entries = frame_entries(&video.id, moments, published);

        let result = write_replace(pool, &video_entry, &frame_entries).await;
        record_replace(result.is_ok(), started.elapsed().as_secs_f64());

        match &result {
            Ok(()) => info!(
                video_id = %video.id,
                "Saved video and {} frames to catalog",
                frame_entries.len()
            ),
            Err(e) => warn!(video_id = %video.id, "Catalog replace rolled back: {}", e),
        }

        result
    }

    /// Fetch one video row.
    pub async fn get_video(&self, video_id: &VideoId) -> CatalogResult<Option<VideoCatalogEntry>> {
        let pool = self.pool()?;
        let row = sqlx::query(
            r#"
            SELECT video_id, title, channel, channel_id, category, duration,
                   view_count, subscriber_count, upload_date, heatmap_raw, processed_at
            FROM videos WHERE video_id = $1
            "#,
        )
        .bind(video_id.as_str())
        .fetch_optional(pool)
        .await?;

        row.as_ref().map(video_from_row).transpose()
    }

    /// Frame rows of one video, ordered by rank.
    pub async fn list_frames(&self, video_id: &VideoId) -> CatalogResult<Vec<FrameCatalogEntry>> {
        let pool = self.pool()?;
        let rows = sqlx::query(
            r#"
            SELECT video_id, rank, timestamp_sec, heat_value, main_location,
                   variant_locations, width, height, byte_size
            FROM frames WHERE video_id = $1
            ORDER BY rank
            "#,
        )
        .bind(video_id.as_str())
        .fetch_all(pool)
        .await?;

        rows.iter().map(frame_from_row).collect()
    }

    /// Number of video rows for `video_id` (0 or 1).
    pub async fn count_videos(&self, video_id: &VideoId) -> CatalogResult<i64> {
        let pool = self.pool()?;
        let row = sqlx::query("SELECT COUNT(*) AS n FROM videos WHERE video_id = $1")
            .bind(video_id.as_str())
            .fetch_one(pool)
            .await?;
        Ok(row.try_get("n")?)
    }
}

async fn write_replace(
    pool: &AnyPool,
    video: &VideoCatalogEntry,
    frames: &[FrameCatalogEntry],
) -> CatalogResult<()> {
    // Dropping `tx` without commit rolls back.
    let mut tx = pool.begin().await?;

    sqlx::query(UPSERT_VIDEO)
        .bind(video.video_id.as_str())
        .bind(video.title.clone())
        .bind(video.channel.clone())
        .bind(video.channel_id.clone())
        .bind(video.category.clone())
        .bind(video.duration)
        .bind(video.view_count)
        .bind(video.subscriber_count)
        .bind(video.upload_date.map(|d| d.format(DATE_FORMAT).to_string()))
        .bind(serde_json::to_string(&video.heatmap_raw)?)
        .bind(video.processed_at.to_rfc3339())
        .execute(&mut *tx)
        .await?;

    sqlx::query(DELETE_FRAMES)
        .bind(video.video_id.as_str())
        .execute(&mut *tx)
        .await?;

    for frame in frames {
        sqlx::query(INSERT_FRAME)
            .bind(frame.video_id.as_str())
            .bind(frame.rank as i64)
            .bind(frame.timestamp_sec)
            .bind(frame.heat_value)
            .bind(frame.main_location.as_str())
            .bind(serde_json::to_string(&frame.variant_locations)?)
            .bind(frame.width as i64)
            .bind(frame.height as i64)
            .bind(to_i64(frame.byte_size))
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(())
}

/// Build the `videos` row for a processed video.
pub fn video_entry(
    video: &VideoRecord,
    heatmap: &[HeatSegment],
    processed_at: DateTime<Utc>,
) -> VideoCatalogEntry {
    VideoCatalogEntry {
        video_id: video.id.clone(),
        title: video.title.clone(),
        channel: video.channel.clone(),
        channel_id: video.channel_id.clone(),
        category: video.category.clone(),
        duration: video.duration.round() as i64,
        view_count: video.view_count.map(to_i64),
        subscriber_count: video.subscriber_count.map(to_i64),
        upload_date: video.upload_date,
        heatmap_raw: heatmap.to_vec(),
        processed_at,
    }
}

/// Build the `frames` rows, one per moment.
pub fn frame_entries(
    video_id: &VideoId,
    moments: &[ExtractedMoment],
    published: &HashMap<u32, PublishedFrame>,
) -> Vec<FrameCatalogEntry> {
    moments
        .iter()
        .map(|m| {
            let rank = m.rank();
            let (main_location, variant_locations) = match published.get(&rank) {
                Some(p) => (p.main_location.clone(), p.variant_locations.clone()),
                None => (frame_object_key(video_id, rank), BTreeMap::new()),
            };
            FrameCatalogEntry {
                video_id: video_id.clone(),
                rank,
                timestamp_sec: m.moment.timestamp,
                heat_value: m.moment.value,
                main_location,
                variant_locations,
                width: m.frame.width,
                height: m.frame.height,
                byte_size: m.frame.byte_size(),
            }
        })
        .collect()
}

fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn to_u32(value: i64, column: &str) -> CatalogResult<u32> {
    u32::try_from(value).map_err(|_| CatalogError::invalid_row(format!("{} out of range: {}", column, value)))
}

fn video_from_row(row: &AnyRow) -> CatalogResult<VideoCatalogEntry> {
    let upload_date: Option<String> = row.try_get("upload_date")?;
    let upload_date = upload_date
        .map(|d| {
            NaiveDate::parse_from_str(&d, DATE_FORMAT)
                .map_err(|e| CatalogError::invalid_row(format!("upload_date {}: {}", d, e)))
        })
        .transpose()?;

    let processed_at: String = row.try_get("processed_at")?;
    let processed_at = DateTime::parse_from_rfc3339(&processed_at)
        .map_err(|e| CatalogError::invalid_row(format!("processed_at {}: {}", processed_at, e)))?
        .with_timezone(&Utc);

    let heatmap_raw: String = row.try_get("heatmap_raw")?;

    Ok(VideoCatalogEntry {
        video_id: VideoId::from(row.try_get::<String, _>("video_id")?),
        title: row.try_get("title")?,
        channel: row.try_get("channel")?,
        channel_id: row.try_get("channel_id")?,
        category: row.try_get("category")?,
        duration: row.try_get("duration")?,
        view_count: row.try_get("view_count")?,
        subscriber_count: row.try_get("subscriber_count")?,
        upload_date,
        heatmap_raw: serde_json::from_str(&heatmap_raw)?,
        processed_at,
    })
}

fn frame_from_row(row: &AnyRow) -> CatalogResult<FrameCatalogEntry> {
    let variant_locations: String = row.try_get("variant_locations")?;
    let byte_size: i64 = row.try_get("byte_size")?;

    Ok(FrameCatalogEntry {
        video_id: VideoId::from(row.try_get::<String, _>("video_id")?),
        rank: to_u32(row.try_get("rank")?, "rank")?,
        timestamp_sec: row.try_get("timestamp_sec")?,
        heat_value: row.try_get("heat_value")?,
        main_location: row.try_get("main_location")?,
        variant_locations: serde_json::from_str(&variant_locations)?,
        width: to_u32(row.try_get("width")?, "width")?,
        height: to_u32(row.try_get("height")?, "height")?,
        byte_size: u64::try_from(byte_size)
            .map_err(|_| CatalogError::invalid_row(format!("byte_size out of range: {}", byte_size)))?,
    })
}
