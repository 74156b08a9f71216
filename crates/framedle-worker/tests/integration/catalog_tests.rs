//! Catalog integration tests against a real PostgreSQL database.

use std::collections::HashMap;

use framedle_catalog::{CatalogConfig, CatalogWriter};
use framedle_models::{HeatSegment, VideoId, VideoRecord};

#[tokio::test]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn test_postgres_replace_roundtrip() {
    dotenvy::dotenv().ok();

    let config = CatalogConfig::from_env();
    assert!(config.is_configured(), "DATABASE_URL must be set");

    let catalog = CatalogWriter::from_config(&config)
        .await
        .expect("Failed to connect");
    catalog.migrate().await.expect("Failed to migrate");

    let mut video = VideoRecord::new("itest_00001", 90.4);
    video.title = Some("Integration test".to_string());
    let heatmap = vec![HeatSegment::new(0.0, 45.0, 0.4), HeatSegment::new(45.0, 90.0, 1.0)];

    catalog
        .replace(&video, &[], &heatmap, &HashMap::new())
        .await
        .expect("Failed to replace");

    let id = VideoId::from("itest_00001");
    let stored = catalog
        .get_video(&id)
        .await
        .expect("Failed to read")
        .expect("Video missing");
    assert_eq!(stored.duration, 90);
    assert_eq!(stored.heatmap_raw.len(), 2);
    assert!(catalog.list_frames(&id).await.unwrap().is_empty());
}
