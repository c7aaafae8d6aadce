//! The public search entry point.

use std::sync::Arc;

use chrono::Utc;
use medloc_core::{
    bounding_box, rank, BoundingBox, Candidate, Coordinate, SearchHistoryEntry, SearchQuery,
    SearchResult,
};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::{HistoryRecorder, InventoryIndex, SearchError, SearchTicket};

/// A query that passed validation and is ready to hit the index.
#[derive(Debug, Clone)]
struct PreparedSearch {
    text: String,
    origin: Coordinate,
    radius_km: f64,
    limit: usize,
    bbox: BoundingBox,
}

/// Validates queries, fetches candidates, ranks them, and hands each completed
/// search to a [`HistoryRecorder`] on a background task.
#[derive(Debug)]
pub struct SearchService<I, H> {
    inventory: I,
    history: Arc<H>,
    max_results: usize,
}

impl<I, H> SearchService<I, H>
where
    I: InventoryIndex,
    H: HistoryRecorder,
{
    /// `max_results` caps every result list; a query's own limit can only
    /// lower it.
    #[must_use]
    pub fn new(inventory: I, history: H, max_results: usize) -> Self {
        Self {
            inventory,
            history: Arc::new(history),
            max_results: max_results.max(1),
        }
    }

    /// Run one search.
    ///
    /// The history write is spawned and never awaited; its failure is logged.
    ///
    /// # Errors
    ///
    /// - [`SearchError::InvalidQuery`] for blank text, a radius that is not a
    ///   positive finite number, or a limit of zero. No backend call is made.
    /// - [`SearchError::MissingLocation`] when the query has no origin.
    /// - [`SearchError::BackendUnavailable`] when the candidate fetch fails;
    ///   nothing is recorded in that case.
    pub async fn search(
        &self,
        query: SearchQuery,
        requester: Option<Uuid>,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let (results, _history) = self.search_tracked(query, requester).await?;
        Ok(results)
    }

    /// Like [`SearchService::search`], but also returns the handle of the
    /// background history write for callers that exit right after searching.
    ///
    /// # Errors
    ///
    /// Same as [`SearchService::search`].
    pub async fn search_tracked(
        &self,
        query: SearchQuery,
        requester: Option<Uuid>,
    ) -> Result<(Vec<SearchResult>, JoinHandle<()>), SearchError> {
        let prepared = self.prepare(query)?;
        let candidates = self.fetch(&prepared).await?;
        Ok(self.finish(prepared, candidates, requester))
    }

    /// Run a search as the newest request of a session.
    ///
    /// If the ticket goes stale before the fetch returns, the fetch is
    /// dropped. A stale ticket never yields results or history.
    ///
    /// # Errors
    ///
    /// [`SearchError::Superseded`] when a newer search began in the same
    /// session, otherwise the same errors as [`SearchService::search`].
    pub async fn search_in_session(
        &self,
        ticket: &mut SearchTicket,
        query: SearchQuery,
        requester: Option<Uuid>,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let prepared = self.prepare(query)?;

        let candidates = tokio::select! {
            biased;
            () = ticket.superseded() => {
                tracing::debug!(generation = ticket.generation(), "search superseded during fetch");
                return Err(SearchError::Superseded);
            }
            fetched = self.fetch(&prepared) => fetched?,
        };

        if !ticket.is_current() {
            return Err(SearchError::Superseded);
        }

        let (results, _history) = self.finish(prepared, candidates, requester);
        Ok(results)
    }

    fn prepare(&self, query: SearchQuery) -> Result<PreparedSearch, SearchError> {
        let text = query.text.trim();
        if text.is_empty() {
            return Err(SearchError::InvalidQuery(
                "query text must not be blank".to_owned(),
            ));
        }
        if !query.radius_km.is_finite() || query.radius_km <= 0.0 {
            return Err(SearchError::InvalidQuery(format!(
                "radius_km must be a positive number, got {}",
                query.radius_km
            )));
        }
        if query.limit == Some(0) {
            return Err(SearchError::InvalidQuery(
                "limit must be at least 1".to_owned(),
            ));
        }
        let origin = query.origin.ok_or(SearchError::MissingLocation)?;

        Ok(PreparedSearch {
            text: text.to_owned(),
            origin,
            radius_km: query.radius_km,
            limit: query
                .limit
                .map_or(self.max_results, |l| l.min(self.max_results)),
            bbox: bounding_box(origin, query.radius_km),
        })
    }

    async fn fetch(&self, prepared: &PreparedSearch) -> Result<Vec<Candidate>, SearchError> {
        self.inventory
            .find_candidates(&prepared.text, prepared.bbox)
            .await
    }

    fn finish(
        &self,
        prepared: PreparedSearch,
        candidates: Vec<Candidate>,
        requester: Option<Uuid>,
    ) -> (Vec<SearchResult>, JoinHandle<()>) {
        let candidate_count = candidates.len();
        let results = rank(
            candidates,
            prepared.origin,
            prepared.radius_km,
            Some(prepared.limit),
        );

        tracing::info!(
            query = %prepared.text,
            radius_km = prepared.radius_km,
            candidates = candidate_count,
            results = results.len(),
            "search completed"
        );

        let entry = SearchHistoryEntry {
            user_id: requester,
            query_text: prepared.text,
            origin: prepared.origin,
            result_count: results.len(),
            created_at: Utc::now(),
        };
        let history = Arc::clone(&self.history);
        let handle = tokio::spawn(async move {
            if let Err(e) = history.record(entry).await {
                tracing::warn!(error = %e, "search history write failed; continuing");
            }
        });

        (results, handle)
    }
}

#[cfg(test)]
#[path = "service_test.rs"]
mod tests;
