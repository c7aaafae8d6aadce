//! YAML seed data for stores and their stocked medicines.
//!
//! Used by `medloc-cli db seed` to populate a development database.

use std::collections::HashSet;
use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;
use crate::ConfigError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicineSeed {
    pub name: String,
    pub generic_name: Option<String>,
    pub price: Decimal,
    pub quantity: i32,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSeed {
    pub store_name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub phone: String,
    #[serde(default = "default_is_open")]
    pub is_open: bool,
    #[serde(default)]
    pub medicines: Vec<MedicineSeed>,
}

fn default_is_open() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct InventorySeedFile {
    pub stores: Vec<StoreSeed>,
}

/// Load and validate an inventory seed file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_inventory_seed(path: &Path) -> Result<InventorySeedFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SeedFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_inventory_seed(&content)
}

fn parse_inventory_seed(content: &str) -> Result<InventorySeedFile, ConfigError> {
    let seed: InventorySeedFile =
        serde_yaml::from_str(content).map_err(ConfigError::SeedFileParse)?;
    validate_seed(&seed)?;
    Ok(seed)
}

fn validate_seed(seed: &InventorySeedFile) -> Result<(), ConfigError> {
    let mut seen_stores = HashSet::new();

    for store in &seed.stores {
        if store.store_name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "store_name must be non-empty".to_string(),
            ));
        }

        if Coordinate::new(store.latitude, store.longitude).is_err() {
            return Err(ConfigError::Validation(format!(
                "store '{}' has invalid coordinates ({}, {})",
                store.store_name, store.latitude, store.longitude
            )));
        }

        let key = (store.store_name.to_lowercase(), store.address.to_lowercase());
        if !seen_stores.insert(key) {
            return Err(ConfigError::Validation(format!(
                "duplicate store: '{}' at '{}'",
                store.store_name, store.address
            )));
        }

        for medicine in &store.medicines {
            if medicine.name.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "store '{}' lists a medicine with an empty name",
                    store.store_name
                )));
            }
            if medicine.price < Decimal::ZERO {
                return Err(ConfigError::Validation(format!(
                    "medicine '{}' at '{}' has negative price {}",
                    medicine.name, store.store_name, medicine.price
                )));
            }
            if medicine.quantity < 0 {
                return Err(ConfigError::Validation(format!(
                    "medicine '{}' at '{}' has negative quantity {}",
                    medicine.name, store.store_name, medicine.quantity
                )));
            }
        }
    }

    Ok(())
}
