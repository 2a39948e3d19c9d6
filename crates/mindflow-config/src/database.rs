//! PostgreSQL connection settings.
//!
//! - `DATABASE_URL`: connection string (required at startup)
//! - `DATABASE_MAX_CONNECTIONS`: pool size, default 10

use std::env;

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl DatabaseConfig {
    /// Reads the settings; an unset `DATABASE_URL` yields an empty url, which
    /// the pool initializer rejects with a clear error.
    pub fn from_env() -> Self {
        Self {
            url: env::var("DATABASE_URL").unwrap_or_default(),
            max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
        }
    }
}
