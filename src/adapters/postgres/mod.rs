//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! - `PostgresRankingStateRepository` - Atomic upsert folds of ranking states
//! - `PostgresProfileCatalog` - Profile definitions and weight tables
//! - `PostgresAccountStore` - Mode and committed profile on the user record

mod account_store;
mod profile_catalog;
mod ranking_state_repository;

pub use account_store::PostgresAccountStore;
pub use profile_catalog::PostgresProfileCatalog;
pub use ranking_state_repository::PostgresRankingStateRepository;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::DatabaseConfig;
use crate::domain::foundation::{DomainError, ErrorCode};

/// Opens the pool and, when configured, applies `migrations/`.
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DomainError> {
    let pool = PgPoolOptions::new()
        .min_connections(config.min_connections)
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout())
        .idle_timeout(config.idle_timeout())
        .connect(&config.url)
        .await
        .map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to connect: {}", e))
        })?;

    if config.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await.map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Migration failed: {}", e))
        })?;
        tracing::info!("Database migrations applied");
    }

    Ok(pool)
}
