//! R2 integration tests.

use framedle_models::constants::{IMAGE_CACHE_CONTROL, IMAGE_CONTENT_TYPE};
use framedle_storage::R2Client;

#[tokio::test]
#[ignore = "requires R2 credentials"]
async fn test_r2_connectivity_and_upload() {
    dotenvy::dotenv().ok();
    let _ = rustls::crypto::ring::default_provider().install_default();

    let client = R2Client::from_env_optional().expect("R2 not configured");
    client
        .check_connectivity()
        .await
        .expect("Bucket not reachable");

    let key = "frames/_itest/f01.webp";
    client
        .upload_bytes(b"RIFF".to_vec(), key, IMAGE_CONTENT_TYPE, IMAGE_CACHE_CONTROL)
        .await
        .expect("Upload failed");
    println!("Uploaded {} to {}", key, client.bucket());
}
