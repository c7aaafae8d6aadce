pub mod app_config;
pub mod config;
pub mod directions;
pub mod geo;
pub mod highlight;
pub mod inventory;
pub mod ranking;
pub mod types;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use directions::{directions_url, tel_link};
pub use geo::{bounding_box, distance_km, round_km, BoundingBox, Coordinate, GeoError};
pub use highlight::extract_highlighted;
pub use inventory::{load_inventory_seed, InventorySeedFile, MedicineSeed, StoreSeed};
pub use ranking::rank;
pub use types::{
    Candidate, MedicineRecord, SearchHistoryEntry, SearchQuery, SearchResult, StoreRecord,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read inventory seed file {path}: {source}")]
    SeedFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse inventory seed file: {0}")]
    SeedFileParse(#[source] serde_yaml::Error),

    #[error("inventory seed validation failed: {0}")]
    Validation(String),
}
