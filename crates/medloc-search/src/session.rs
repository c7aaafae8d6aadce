//! Generation tracking so an abandoned search never delivers stale results.
//!
//! A [`SearchSession`] belongs to one caller (a user, a terminal). Every
//! [`SearchSession::begin`] bumps the generation; tickets from earlier
//! generations observe the change and resolve [`SearchTicket::superseded`].

use tokio::sync::watch;

#[derive(Debug)]
pub struct SearchSession {
    generation: watch::Sender<u64>,
}

impl Default for SearchSession {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchSession {
    #[must_use]
    pub fn new() -> Self {
        let (generation, _) = watch::channel(0);
        Self { generation }
    }

    /// Start a new search, superseding any search still in flight.
    #[must_use]
    pub fn begin(&self) -> SearchTicket {
        let mut issued = 0;
        self.generation.send_modify(|g| {
            *g += 1;
            issued = *g;
        });
        SearchTicket {
            generation: issued,
            current: self.generation.subscribe(),
        }
    }

    /// Abandon the in-flight search without starting another.
    pub fn cancel(&self) {
        self.generation.send_modify(|g| *g += 1);
    }

    #[must_use]
    pub fn current_generation(&self) -> u64 {
        *self.generation.borrow()
    }
}

/// Handle for one search within a [`SearchSession`].
#[derive(Debug)]
pub struct SearchTicket {
    generation: u64,
    current: watch::Receiver<u64>,
}

impl SearchTicket {
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// True while no newer search has started in the session.
    #[must_use]
    pub fn is_current(&self) -> bool {
        *self.current.borrow() == self.generation
    }

    /// Resolves once this ticket is stale. A dropped session counts as stale.
    pub async fn superseded(&mut self) {
        while self.is_current() {
            if self.current.changed().await.is_err() {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn begin_issues_increasing_generations() {
        let session = SearchSession::new();
        let first = session.begin();
        let second = session.begin();

        assert_eq!(first.generation(), 1);
        assert_eq!(second.generation(), 2);
        assert!(!first.is_current());
        assert!(second.is_current());
        assert_eq!(session.current_generation(), 2);
    }

    #[test]
    fn cancel_invalidates_the_live_ticket() {
        let session = SearchSession::new();
        let ticket = session.begin();
        session.cancel();
        assert!(!ticket.is_current());
    }

    #[tokio::test]
    async fn superseded_resolves_when_a_newer_search_begins() {
        let session = SearchSession::new();
        let mut ticket = session.begin();

        let waiter = tokio::spawn(async move {
            ticket.superseded().await;
        });
        tokio::task::yield_now().await;
        let _newer = session.begin();

        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("superseded should resolve")
            .expect("waiter task");
    }

    #[tokio::test]
    async fn superseded_resolves_when_session_is_dropped() {
        let session = SearchSession::new();
        let mut ticket = session.begin();
        drop(session);

        tokio::time::timeout(Duration::from_secs(1), ticket.superseded())
            .await
            .expect("dropped session counts as stale");
    }

    #[tokio::test]
    async fn current_ticket_stays_pending() {
        let session = SearchSession::new();
        let mut ticket = session.begin();

        let outcome = tokio::time::timeout(Duration::from_millis(20), ticket.superseded()).await;
        assert!(outcome.is_err(), "a current ticket must not resolve");
    }
}
