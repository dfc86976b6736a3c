//! Inventory seed sources.

use std::fs;
use std::path::Path;

use thiserror::Error;

use bazaar_core::Money;
use bazaar_market::NewItem;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read seed file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse seed file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Inventory listed when no seed file is configured.
pub fn default_inventory() -> Vec<NewItem> {
    vec![
        NewItem {
            name: "Phone".to_string(),
            price: Money::new(500),
            barcode: "893212299897".to_string(),
            description: "Smartphone with a 6.1 inch display".to_string(),
        },
        NewItem {
            name: "Laptop".to_string(),
            price: Money::new(900),
            barcode: "123985473165".to_string(),
            description: "14 inch ultrabook".to_string(),
        },
        NewItem {
            name: "Keyboard".to_string(),
            price: Money::new(150),
            barcode: "231985128446".to_string(),
            description: "Mechanical keyboard".to_string(),
        },
    ]
}

/// Parse a JSON array of `{name, price, barcode, description}` objects.
pub fn parse_seed(json: &str) -> Result<Vec<NewItem>, serde_json::Error> {
    serde_json::from_str(json)
}

pub fn load_seed_file(path: &Path) -> Result<Vec<NewItem>, SeedError> {
    let display = path.display().to_string();
    let raw = fs::read_to_string(path).map_err(|source| SeedError::Io {
        path: display.clone(),
        source,
    })?;
    parse_seed(&raw).map_err(|source| SeedError::Parse {
        path: display,
        source,
    })
}
