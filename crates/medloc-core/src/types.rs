//! Domain records shared by the search pipeline, persistence, and HTTP layers.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geo::{round_km, Coordinate, GeoError};

/// A stocked medicine listing at one store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicineRecord {
    pub id: Uuid,
    pub name: String,
    pub generic_name: Option<String>,
    pub price: Decimal,
    pub quantity: i32,
    pub image_url: Option<String>,
    pub store_id: Uuid,
}

impl MedicineRecord {
    #[must_use]
    pub fn in_stock(&self) -> bool {
        self.quantity > 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreRecord {
    pub id: Uuid,
    pub store_name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub phone: String,
    pub is_open: bool,
}

impl StoreRecord {
    /// The store's position as a validated coordinate.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::InvalidCoordinate`] if the stored latitude or
    /// longitude is out of range.
    pub fn coordinate(&self) -> Result<Coordinate, GeoError> {
        Coordinate::new(self.latitude, self.longitude)
    }
}

/// An unranked (medicine, store) pair returned by the inventory index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub medicine: MedicineRecord,
    pub store: StoreRecord,
}

/// A ranked search hit. `distance_km` is kept at full precision; use
/// [`SearchResult::display_distance_km`] for presentation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub medicine: MedicineRecord,
    pub store: StoreRecord,
    pub distance_km: f64,
}

impl SearchResult {
    #[must_use]
    pub fn display_distance_km(&self) -> f64 {
        round_km(self.distance_km)
    }
}

/// Caller-supplied search input.
///
/// `origin` is optional so a missing device location can be reported
/// explicitly instead of being guessed.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub text: String,
    pub origin: Option<Coordinate>,
    pub radius_km: f64,
    pub limit: Option<usize>,
}

/// One completed search, written to history after the response is produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHistoryEntry {
    pub user_id: Option<Uuid>,
    pub query_text: String,
    pub origin: Coordinate,
    pub result_count: usize,
    pub created_at: DateTime<Utc>,
}
