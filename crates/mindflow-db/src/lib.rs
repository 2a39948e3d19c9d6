//! # Mindflow DB
//!
//! Database pool, embedded migrations, and the storage error type shared by
//! every persistence adapter.
//!
//! # Example
//!
//! ```ignore
//! use mindflow_db::{MIGRATOR, init_db_pool};
//!
//! let pool = init_db_pool(&config.database).await?;
//! MIGRATOR.run(&pool).await?;
//! ```

use mindflow_config::DatabaseConfig;
use mindflow_core::WorkflowError;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

pub use sqlx::PgPool;

/// Schema migrations embedded from the workspace `migrations/` directory.
pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Creates the PostgreSQL connection pool.
///
/// The pool is cheaply cloneable and safe for concurrent use; it is the only
/// shared resource between request tasks.
///
/// # Errors
///
/// Returns [`sqlx::Error::Configuration`] if the url is empty, or the
/// connection error if the database cannot be reached.
pub async fn init_db_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    if config.url.trim().is_empty() {
        return Err(sqlx::Error::Configuration(
            "DATABASE_URL must be set".into(),
        ));
    }

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.url)
        .await?;

    info!(max_connections = config.max_connections, "Database pool ready");
    Ok(pool)
}

/// Failure of a persistence operation, with "not found" and constraint
/// violations kept distinguishable from opaque backend errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("referenced record does not exist")]
    ForeignKeyViolation,
    #[error("record already exists")]
    UniqueViolation,
    #[error(transparent)]
    Backend(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                StoreError::ForeignKeyViolation
            }
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                StoreError::UniqueViolation
            }
            _ => StoreError::Backend(err),
        }
    }
}

/// Generic mapping; services override it where they can name the entity.
impl From<StoreError> for WorkflowError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => WorkflowError::not_found("Record not found"),
            StoreError::ForeignKeyViolation => {
                WorkflowError::DanglingReference("Referenced record does not exist".to_string())
            }
            StoreError::UniqueViolation => WorkflowError::conflict("Record already exists"),
            StoreError::Backend(e) => WorkflowError::persistence(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        assert!(matches!(
            StoreError::from(sqlx::Error::RowNotFound),
            StoreError::NotFound
        ));
    }

    #[test]
    fn test_pool_timeout_is_backend_error() {
        assert!(matches!(
            StoreError::from(sqlx::Error::PoolTimedOut),
            StoreError::Backend(_)
        ));
    }

    #[test]
    fn test_store_error_to_workflow_error() {
        assert!(matches!(
            WorkflowError::from(StoreError::ForeignKeyViolation),
            WorkflowError::DanglingReference(_)
        ));
        assert!(matches!(
            WorkflowError::from(StoreError::UniqueViolation),
            WorkflowError::Conflict(_)
        ));
        assert!(matches!(
            WorkflowError::from(StoreError::Backend(sqlx::Error::PoolClosed)),
            WorkflowError::Persistence(_)
        ));
    }

    #[tokio::test]
    async fn test_init_db_pool_rejects_empty_url() {
        let config = DatabaseConfig {
            url: String::new(),
            max_connections: 1,
        };
        assert!(matches!(
            init_db_pool(&config).await,
            Err(sqlx::Error::Configuration(_))
        ));
    }
}
