//! Catalog configuration.

/// Default connection pool size.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Catalog database configuration.
#[derive(Debug, Clone, Default)]
pub struct CatalogConfig {
    /// Connection URL; `None` leaves the catalog unconfigured
    pub database_url: Option<String>,
    /// Maximum pooled connections
    pub max_connections: u32,
}

impl CatalogConfig {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: Some(database_url.into()),
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }

    /// Load from `DATABASE_URL` and `DATABASE_MAX_CONNECTIONS`.
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
            max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_MAX_CONNECTIONS),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.database_url.is_some()
    }

    /// The URL actually used to connect.
    ///
    /// PostgreSQL URLs without an explicit `sslmode` get `sslmode=require`.
    pub fn connect_url(&self) -> Option<String> {
        self.database_url.as_deref().map(with_required_tls)
    }
}

fn with_required_tls(url: &str) -> String {
    let is_postgres = url.starts_with("postgres://") || url.starts_with("postgresql://");
    if !is_postgres || url.contains("sslmode=") {
        return url.to_string();
    }
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{}{}sslmode=require", url, separator)
}
