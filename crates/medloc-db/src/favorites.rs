//! Database operations for the `favorites` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A favorited store joined with its current details.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FavoriteStoreRow {
    pub store_id: Uuid,
    pub store_name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub phone: String,
    pub is_open: bool,
    pub favorited_at: DateTime<Utc>,
}

/// Mark a store as a favorite for `user_id`.
///
/// Returns `true` if a new favorite was created, `false` if it already existed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails; an unknown `store_id`
/// surfaces as a foreign-key violation (see [`DbError::is_foreign_key_violation`]).
pub async fn add_favorite(pool: &PgPool, user_id: Uuid, store_id: Uuid) -> Result<bool, DbError> {
    let rows_affected = sqlx::query(
        "INSERT INTO favorites (user_id, store_id) \
         VALUES ($1, $2) \
         ON CONFLICT (user_id, store_id) DO NOTHING",
    )
    .bind(user_id)
    .bind(store_id)
    .execute(pool)
    .await?
    .rows_affected();

    Ok(rows_affected == 1)
}

/// List a user's favorite stores, most recently added first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_favorites(pool: &PgPool, user_id: Uuid) -> Result<Vec<FavoriteStoreRow>, DbError> {
    let rows = sqlx::query_as::<_, FavoriteStoreRow>(
        "SELECT s.id AS store_id, s.store_name, s.address, s.latitude, s.longitude, \
                s.phone, s.is_open, f.created_at AS favorited_at \
         FROM favorites f \
         JOIN stores s ON s.id = f.store_id \
         WHERE f.user_id = $1 \
         ORDER BY f.created_at DESC, s.store_name ASC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Remove a favorite.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the user had not favorited the store, or
/// [`DbError::Sqlx`] if the delete fails.
pub async fn remove_favorite(pool: &PgPool, user_id: Uuid, store_id: Uuid) -> Result<(), DbError> {
    let rows_affected = sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND store_id = $2")
        .bind(user_id)
        .bind(store_id)
        .execute(pool)
        .await?
        .rows_affected();

    if rows_affected == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}
