//! Candidate lookup: the [`InventoryIndex`] seam plus Postgres and in-memory
//! implementations.

use async_trait::async_trait;
use medloc_core::{BoundingBox, Candidate};
use sqlx::PgPool;

use crate::SearchError;

/// Source of unranked (medicine, store) pairs.
///
/// Implementations match `text` case-insensitively against medicine name and
/// generic name, restrict stores to `bbox`, and leave out zero-quantity
/// listings. Duplicates are allowed; the ranker removes them.
#[async_trait]
pub trait InventoryIndex: Send + Sync {
    async fn find_candidates(
        &self,
        text: &str,
        bbox: BoundingBox,
    ) -> Result<Vec<Candidate>, SearchError>;
}

/// [`InventoryIndex`] backed by the `medicines` and `stores` tables.
#[derive(Debug, Clone)]
pub struct PgInventory {
    pool: PgPool,
}

impl PgInventory {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InventoryIndex for PgInventory {
    async fn find_candidates(
        &self,
        text: &str,
        bbox: BoundingBox,
    ) -> Result<Vec<Candidate>, SearchError> {
        let rows = medloc_db::find_candidates(&self.pool, text, bbox)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "inventory candidate query failed");
                SearchError::BackendUnavailable(e.to_string())
            })?;

        Ok(rows.into_iter().map(Candidate::from).collect())
    }
}

/// [`InventoryIndex`] over a fixed list of candidates.
#[derive(Debug, Clone, Default)]
pub struct MemoryInventory {
    candidates: Vec<Candidate>,
}

impl MemoryInventory {
    #[must_use]
    pub fn new(candidates: Vec<Candidate>) -> Self {
        Self { candidates }
    }
}

#[async_trait]
impl InventoryIndex for MemoryInventory {
    async fn find_candidates(
        &self,
        text: &str,
        bbox: BoundingBox,
    ) -> Result<Vec<Candidate>, SearchError> {
        let needle = text.trim().to_lowercase();

        Ok(self
            .candidates
            .iter()
            .filter(|c| c.medicine.in_stock())
            .filter(|c| {
                c.medicine.name.to_lowercase().contains(&needle)
                    || c
                        .medicine
                        .generic_name
                        .as_deref()
                        .is_some_and(|g| g.to_lowercase().contains(&needle))
            })
            .filter(|c| c.store.coordinate().is_ok_and(|p| bbox.contains(p)))
            .cloned()
            .collect())
    }
}
