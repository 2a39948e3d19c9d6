//! # Mindflow Config
//!
//! Configuration types for the Mindflow API, loaded from environment variables
//! once at process start and passed down explicitly. Nothing below the binary's
//! `main` reads the environment.
//!
//! - [`jwt`]: access token secret and lifetime
//! - [`cors`]: allowed browser origins
//! - [`email`]: SMTP notification settings
//! - [`database`]: PostgreSQL connection settings
//! - [`server`]: bind address
//! - [`observability`]: log files, OTLP export, and Prometheus metrics
//!
//! # Example
//!
//! ```ignore
//! use mindflow_config::AppConfig;
//!
//! dotenvy::dotenv().ok();
//! let config = AppConfig::from_env()?;
//! let pool = mindflow_db::init_db_pool(&config.database).await?;
//! let state = AppState::new(&config, pool);
//! ```

pub mod cors;
pub mod database;
pub mod email;
pub mod jwt;
pub mod observability;
pub mod server;

pub use cors::CorsConfig;
pub use database::DatabaseConfig;
pub use email::EmailConfig;
pub use jwt::{JwtConfig, JwtConfigError};
pub use observability::ObservabilityConfig;
pub use server::ServerConfig;

/// Every configuration section the API needs, built once at startup.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub email: EmailConfig,
    pub cors: CorsConfig,
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// # Errors
    ///
    /// Fails when a required setting (the JWT secret) is missing or unsafe.
    pub fn from_env() -> Result<Self, JwtConfigError> {
        Ok(Self {
            server: ServerConfig::from_env(),
            database: DatabaseConfig::from_env(),
            jwt: JwtConfig::from_env()?,
            email: EmailConfig::from_env(),
            cors: CorsConfig::from_env(),
            observability: ObservabilityConfig::from_env(),
        })
    }
}
