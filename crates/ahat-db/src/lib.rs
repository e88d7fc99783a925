//! Product storage: the [`ProductStore`] seam, its mock and Postgres
//! implementations, and pool/migration plumbing.

pub mod mock;
pub mod products;
pub mod store;
pub mod sync_runs;

use std::{collections::HashSet, time::Duration};

use ahat_core::{AppConfig, CoreError};
use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;

pub use mock::{generate_product, generate_products, MockProductStore};
pub use products::{PgProductStore, ProductRow};
pub use store::ProductStore;

const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_MIN_CONNECTIONS: u32 = 1;
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 10;

// Relative to crates/ahat-db/Cargo.toml.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations");

#[derive(Debug, Clone, Copy)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
            min_connections: DEFAULT_MIN_CONNECTIONS,
            acquire_timeout_secs: DEFAULT_ACQUIRE_TIMEOUT_SECS,
        }
    }
}

impl PoolConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            max_connections: config.db_max_connections,
            min_connections: config.db_min_connections,
            acquire_timeout_secs: config.db_acquire_timeout_secs,
        }
    }
}

#[derive(Debug, Error)]
pub enum DbError {
    #[error("invalid product row {id}: {reason}")]
    InvalidRow { id: String, reason: String },
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Opens the catalog pool.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the first connection cannot be established
/// within the acquire timeout.
pub async fn connect_pool(database_url: &str, config: PoolConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections.min(config.max_connections))
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect(database_url)
        .await
}

/// Applies pending migrations and returns how many of them ran.
///
/// # Errors
///
/// Returns [`sqlx::migrate::MigrateError`] if any migration fails.
pub async fn run_migrations(pool: &PgPool) -> Result<usize, sqlx::migrate::MigrateError> {
    let before = applied_versions(pool).await;
    MIGRATOR.run(pool).await?;

    Ok(MIGRATOR
        .iter()
        .filter(|m| !m.migration_type.is_down_migration() && !before.contains(&m.version))
        .count())
}

/// Versions recorded in `_sqlx_migrations`; empty on a fresh database where
/// the table does not exist yet.
async fn applied_versions(pool: &PgPool) -> HashSet<i64> {
    sqlx::query_scalar::<_, i64>("SELECT version FROM _sqlx_migrations WHERE success")
        .fetch_all(pool)
        .await
        .map(|versions| versions.into_iter().collect())
        .unwrap_or_default()
}

/// Fresh catalog id of the form `AHAT-` followed by 13 uppercase hex digits.
#[must_use]
pub fn new_catalog_id() -> String {
    let hex = uuid::Uuid::new_v4().simple().to_string();
    format!("AHAT-{}", hex[..13].to_ascii_uppercase())
}
