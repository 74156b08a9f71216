//! Catalog schema.
//!
//! The statements stay within the SQL subset shared by PostgreSQL and
//! SQLite: timestamps, dates and JSON documents are stored as TEXT.

/// Statements creating the catalog tables, run in order.
pub const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS videos (
        video_id TEXT PRIMARY KEY,
        title TEXT,
        channel TEXT,
        channel_id TEXT,
        category TEXT,
        duration BIGINT NOT NULL,
        view_count BIGINT,
        subscriber_count BIGINT,
        upload_date TEXT,
        heatmap_raw TEXT NOT NULL,
        processed_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS frames (
        video_id TEXT NOT NULL REFERENCES videos (video_id),
        rank BIGINT NOT NULL,
        timestamp_sec DOUBLE PRECISION NOT NULL,
        heat_value DOUBLE PRECISION NOT NULL,
        main_location TEXT NOT NULL,
        variant_locations TEXT NOT NULL,
        width BIGINT NOT NULL,
        height BIGINT NOT NULL,
        byte_size BIGINT NOT NULL,
        PRIMARY KEY (video_id, rank)
    )
    "#,
];
