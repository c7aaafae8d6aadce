//! Best-effort persistence of completed searches.

use async_trait::async_trait;
use medloc_core::SearchHistoryEntry;
use sqlx::PgPool;

use crate::SearchError;

/// Sink for completed searches. Each call stores one entry; repeated calls
/// with the same entry store duplicates.
#[async_trait]
pub trait HistoryRecorder: Send + Sync + 'static {
    async fn record(&self, entry: SearchHistoryEntry) -> Result<(), SearchError>;
}

/// [`HistoryRecorder`] writing to the `search_history` table.
#[derive(Debug, Clone)]
pub struct PgHistory {
    pool: PgPool,
}

impl PgHistory {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HistoryRecorder for PgHistory {
    async fn record(&self, entry: SearchHistoryEntry) -> Result<(), SearchError> {
        medloc_db::insert_search_history(&self.pool, &entry)
            .await
            .map(|_| ())
            .map_err(|e| SearchError::HistoryWriteFailed(e.to_string()))
    }
}
