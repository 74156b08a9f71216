//! Catalog metrics.

use metrics::{counter, histogram};

/// Metric name constants for consistency.
pub mod names {
    /// Catalog replace transactions by status.
    pub const REPLACE_TOTAL: &str = "catalog_replace_total";

    /// Replace transaction latency in seconds.
    pub const REPLACE_SECONDS: &str = "catalog_replace_seconds";
}

/// Record a finished `replace` call.
pub fn record_replace(success: bool, elapsed_secs: f64) {
    let status = if success { "success" } else { "error" };

    counter!(names::REPLACE_TOTAL, "status" => status).increment(1);
    histogram!(names::REPLACE_SECONDS).record(elapsed_secs);
}
