//! Durable catalog of processed videos and their frames.
//!
//! This crate provides:
//! - Schema bootstrap for the `videos` and `frames` tables
//! - The transactional `replace` of one video's catalog state
//! - Read-back queries used by tests and batch summaries
//! - Catalog metrics

pub mod config;
pub mod error;
pub mod metrics;
pub mod schema;
pub mod writer;

pub use config::CatalogConfig;
pub use error::{CatalogError, CatalogResult};
pub use writer::CatalogWriter;
