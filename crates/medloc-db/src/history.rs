//! Database operations for the `search_history` table.

use chrono::{DateTime, Utc};
use medloc_core::SearchHistoryEntry;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A row from the `search_history` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SearchHistoryRow {
    pub public_id: Uuid,
    pub user_id: Option<Uuid>,
    pub query_text: String,
    pub latitude: f64,
    pub longitude: f64,
    pub result_count: i32,
    pub created_at: DateTime<Utc>,
}

/// Insert one history row for a completed search.
///
/// Every call creates a new row; repeated searches are recorded repeatedly.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_search_history(
    pool: &PgPool,
    entry: &SearchHistoryEntry,
) -> Result<SearchHistoryRow, DbError> {
    let result_count = i32::try_from(entry.result_count).unwrap_or(i32::MAX);

    let row = sqlx::query_as::<_, SearchHistoryRow>(
        "INSERT INTO search_history \
             (user_id, query_text, latitude, longitude, result_count, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         RETURNING public_id, user_id, query_text, latitude, longitude, \
                   result_count, created_at",
    )
    .bind(entry.user_id)
    .bind(&entry.query_text)
    .bind(entry.origin.latitude())
    .bind(entry.origin.longitude())
    .bind(result_count)
    .bind(entry.created_at)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// List a user's most recent searches, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_search_history(
    pool: &PgPool,
    user_id: Uuid,
    limit: i64,
) -> Result<Vec<SearchHistoryRow>, DbError> {
    let rows = sqlx::query_as::<_, SearchHistoryRow>(
        "SELECT public_id, user_id, query_text, latitude, longitude, \
                result_count, created_at \
         FROM search_history \
         WHERE user_id = $1 \
         ORDER BY created_at DESC, id DESC \
         LIMIT $2",
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Delete every history row for a user. Returns the number of rows removed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn clear_search_history(pool: &PgPool, user_id: Uuid) -> Result<u64, DbError> {
    let rows_affected = sqlx::query("DELETE FROM search_history WHERE user_id = $1")
        .bind(user_id)
        .execute(pool)
        .await?
        .rows_affected();

    Ok(rows_affected)
}
