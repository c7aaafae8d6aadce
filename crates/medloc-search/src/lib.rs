//! Geospatial medicine search: validation, candidate lookup, ranking, and
//! best-effort history recording.

pub mod error;
pub mod history;
pub mod inventory;
pub mod service;
pub mod session;

pub use error::SearchError;
pub use history::{HistoryRecorder, PgHistory};
pub use inventory::{InventoryIndex, MemoryInventory, PgInventory};
pub use service::SearchService;
pub use session::{SearchSession, SearchTicket};

/// The search service wired to Postgres for both inventory and history.
pub type PgSearchService = SearchService<PgInventory, PgHistory>;

/// Build a [`PgSearchService`] sharing one pool for reads and history writes.
#[must_use]
pub fn pg_search_service(pool: sqlx::PgPool, max_results: usize) -> PgSearchService {
    SearchService::new(PgInventory::new(pool.clone()), PgHistory::new(pool), max_results)
}
