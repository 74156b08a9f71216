//! Cloudflare R2 storage for published frames.
//!
//! This crate provides:
//! - The `BlobSink` abstraction and its R2 implementation
//! - The `Publisher`, which uploads a video's frames and variants

pub mod client;
pub mod error;
pub mod publisher;
pub mod sink;

pub use client::{R2Client, R2Config};
pub use error::{StorageError, StorageResult};
pub use publisher::Publisher;
pub use sink::BlobSink;
