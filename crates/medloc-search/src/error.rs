use medloc_core::GeoError;
use thiserror::Error;

/// Errors returned by the search pipeline.
#[derive(Debug, Error)]
pub enum SearchError {
    /// A latitude or longitude was outside its valid range.
    #[error(transparent)]
    InvalidCoordinate(#[from] GeoError),

    /// Blank query text, a non-positive radius, or a zero result limit.
    #[error("invalid search query: {0}")]
    InvalidQuery(String),

    /// The caller supplied no origin; a location is never guessed.
    #[error("a location is required to search nearby stores")]
    MissingLocation,

    /// The inventory store could not be queried. Not retried here.
    #[error("inventory backend unavailable: {0}")]
    BackendUnavailable(String),

    /// A history row could not be written.
    #[error("failed to record search history: {0}")]
    HistoryWriteFailed(String),

    /// A newer search in the same session replaced this one.
    #[error("search superseded by a newer request")]
    Superseded,
}

impl SearchError {
    /// Stable machine-readable code used in API error envelopes.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            SearchError::InvalidCoordinate(_) | SearchError::InvalidQuery(_) => "validation_error",
            SearchError::MissingLocation => "missing_location",
            SearchError::BackendUnavailable(_) => "backend_unavailable",
            SearchError::HistoryWriteFailed(_) => "internal_error",
            SearchError::Superseded => "superseded",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_failures_share_a_code() {
        let geo = SearchError::from(GeoError::InvalidCoordinate {
            latitude: 91.0,
            longitude: 0.0,
        });
        assert_eq!(geo.code(), "validation_error");
        assert_eq!(
            SearchError::InvalidQuery("blank".to_owned()).code(),
            "validation_error"
        );
    }

    #[test]
    fn operational_failures_have_distinct_codes() {
        assert_eq!(SearchError::MissingLocation.code(), "missing_location");
        assert_eq!(
            SearchError::BackendUnavailable("down".to_owned()).code(),
            "backend_unavailable"
        );
        assert_eq!(SearchError::Superseded.code(), "superseded");
    }
}
