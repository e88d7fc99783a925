//! Database operations for `sync_runs`.

use ahat_core::SyncCounts;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Records a completed sync with `completed_at = NOW()`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_sync_run(pool: &PgPool, counts: &SyncCounts) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO sync_runs (synced, inserted, updated, skipped, failed) \
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(to_i64(counts.synced))
    .bind(to_i64(counts.inserted))
    .bind(to_i64(counts.updated))
    .bind(to_i64(counts.skipped))
    .bind(to_i64(counts.failed))
    .execute(pool)
    .await?;

    Ok(())
}

/// Completion time of the most recent sync, or `None` if none has run.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn last_completed_at(pool: &PgPool) -> Result<Option<DateTime<Utc>>, DbError> {
    let last = sqlx::query_scalar::<_, Option<DateTime<Utc>>>(
        "SELECT MAX(completed_at) FROM sync_runs",
    )
    .fetch_one(pool)
    .await?;

    Ok(last)
}
