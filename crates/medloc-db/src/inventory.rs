//! Read path for the medicine search: text match joined with stores inside a
//! bounding box.

use medloc_core::{BoundingBox, Candidate, MedicineRecord, StoreRecord};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

/// One joined `medicines` x `stores` row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CandidateRow {
    pub medicine_id: Uuid,
    pub medicine_name: String,
    pub generic_name: Option<String>,
    pub price: Decimal,
    pub quantity: i32,
    pub image_url: Option<String>,
    pub store_id: Uuid,
    pub store_name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub phone: String,
    pub is_open: bool,
}

impl From<CandidateRow> for Candidate {
    fn from(row: CandidateRow) -> Self {
        Candidate {
            medicine: MedicineRecord {
                id: row.medicine_id,
                name: row.medicine_name,
                generic_name: row.generic_name,
                price: row.price,
                quantity: row.quantity,
                image_url: row.image_url,
                store_id: row.store_id,
            },
            store: StoreRecord {
                id: row.store_id,
                store_name: row.store_name,
                address: row.address,
                latitude: row.latitude,
                longitude: row.longitude,
                phone: row.phone,
                is_open: row.is_open,
            },
        }
    }
}

/// Escape `LIKE` metacharacters so user text matches literally.
///
/// Postgres uses backslash as the default `LIKE` escape character.
#[must_use]
pub fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Fetch in-stock medicines whose name or generic name contains `text`
/// (case-insensitive), joined with stores whose coordinates fall in `bbox`.
///
/// The result is unordered and may contain several listings for the same
/// store; ranking and deduplication happen in the caller.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn find_candidates(
    pool: &PgPool,
    text: &str,
    bbox: BoundingBox,
) -> Result<Vec<CandidateRow>, sqlx::Error> {
    let pattern = format!("%{}%", escape_like(text.trim()));

    sqlx::query_as::<_, CandidateRow>(
        "SELECT m.id AS medicine_id, m.name AS medicine_name, m.generic_name, \
                m.price, m.quantity, m.image_url, \
                s.id AS store_id, s.store_name, s.address, \
                s.latitude, s.longitude, s.phone, s.is_open \
         FROM medicines m \
         JOIN stores s ON s.id = m.store_id \
         WHERE m.quantity > 0 \
           AND (m.name ILIKE $1 OR m.generic_name ILIKE $1) \
           AND s.latitude BETWEEN $2 AND $3 \
           AND ( \
                ($4::float8 <= $5::float8 AND s.longitude BETWEEN $4 AND $5) \
             OR ($4::float8 > $5::float8 AND (s.longitude >= $4 OR s.longitude <= $5)) \
           )",
    )
    .bind(pattern)
    .bind(bbox.min_lat)
    .bind(bbox.max_lat)
    .bind(bbox.min_lng)
    .bind(bbox.max_lng)
    .fetch_all(pool)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_like_leaves_plain_text_alone() {
        assert_eq!(escape_like("paracetamol 500"), "paracetamol 500");
    }

    #[test]
    fn escape_like_escapes_wildcards() {
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
    }

    #[test]
    fn candidate_row_converts_into_domain_pair() {
        let store_id = Uuid::new_v4();
        let row = CandidateRow {
            medicine_id: Uuid::new_v4(),
            medicine_name: "Dolo 650".to_string(),
            generic_name: Some("Paracetamol".to_string()),
            price: Decimal::new(3050, 2),
            quantity: 12,
            image_url: None,
            store_id,
            store_name: "Apollo".to_string(),
            address: "12 MG Road".to_string(),
            latitude: 12.97,
            longitude: 77.59,
            phone: "080".to_string(),
            is_open: true,
        };

        let candidate = Candidate::from(row);
        assert_eq!(candidate.medicine.store_id, store_id);
        assert_eq!(candidate.store.id, store_id);
        assert_eq!(candidate.medicine.generic_name.as_deref(), Some("Paracetamol"));
    }
}
