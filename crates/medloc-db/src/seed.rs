use medloc_core::StoreSeed;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// Upsert stores from seed data and replace their medicine listings.
///
/// Stores are matched on `(store_name, address)`. Each seeded store's
/// existing medicines are deleted and re-inserted from the seed so repeated
/// runs converge on the file contents. All writes run in one transaction.
///
/// Returns `(stores, medicines)` written.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any database operation fails.
pub async fn seed_inventory(pool: &PgPool, stores: &[StoreSeed]) -> Result<(usize, usize), DbError> {
    let mut tx = pool.begin().await?;
    let mut medicine_count = 0usize;

    for store in stores {
        let store_id: Uuid = sqlx::query_scalar(
            "INSERT INTO stores (store_name, address, latitude, longitude, phone, is_open) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (store_name, address) DO UPDATE SET \
                 latitude = EXCLUDED.latitude, \
                 longitude = EXCLUDED.longitude, \
                 phone = EXCLUDED.phone, \
                 is_open = EXCLUDED.is_open, \
                 updated_at = NOW() \
             RETURNING id",
        )
        .bind(&store.store_name)
        .bind(&store.address)
        .bind(store.latitude)
        .bind(store.longitude)
        .bind(&store.phone)
        .bind(store.is_open)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM medicines WHERE store_id = $1")
            .bind(store_id)
            .execute(&mut *tx)
            .await?;

        for medicine in &store.medicines {
            sqlx::query(
                "INSERT INTO medicines \
                     (store_id, name, generic_name, price, quantity, image_url) \
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(store_id)
            .bind(&medicine.name)
            .bind(&medicine.generic_name)
            .bind(medicine.price)
            .bind(medicine.quantity)
            .bind(&medicine.image_url)
            .execute(&mut *tx)
            .await?;
            medicine_count += 1;
        }
    }

    tx.commit().await?;
    Ok((stores.len(), medicine_count))
}
