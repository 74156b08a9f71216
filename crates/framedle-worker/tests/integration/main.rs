//! Integration test runner.
//!
//! Run tests that require external tools or services:
//!   cargo test -p framedle-worker --test integration -- --ignored

mod catalog_tests;
mod media_tests;
mod storage_tests;
