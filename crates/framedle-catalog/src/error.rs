//! Catalog error types.

use thiserror::Error;

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors that can occur during catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Catalog database not configured (set DATABASE_URL)")]
    NotConfigured,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid row: {0}")]
    InvalidRow(String),
}

impl CatalogError {
    pub fn invalid_row(msg: impl Into<String>) -> Self {
        Self::InvalidRow(msg.into())
    }

    /// True when the failure is due to missing configuration rather than
    /// the database itself.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::NotConfigured)
    }
}
