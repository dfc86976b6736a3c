//! Runtime configuration, read from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

use bazaar_core::Money;

pub const ENV_BIND_ADDR: &str = "BAZAAR_BIND_ADDR";
pub const ENV_STARTING_BUDGET: &str = "BAZAAR_STARTING_BUDGET";
pub const ENV_SEED_FILE: &str = "BAZAAR_SEED_FILE";

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_STARTING_BUDGET: u64 = 1000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} is not a valid value: {value:?} ({reason})")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketConfig {
    pub bind_addr: SocketAddr,
    /// Budget granted to every newly registered user.
    pub starting_budget: Money,
    /// JSON inventory to list at startup; the built-in inventory when absent.
    pub seed_file: Option<PathBuf>,
}

impl MarketConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_addr = get(ENV_BIND_ADDR)
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                var: ENV_BIND_ADDR,
                value: get(ENV_BIND_ADDR).unwrap_or_default(),
                reason: e.to_string(),
            })?;

        let starting_budget = match get(ENV_STARTING_BUDGET) {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map(Money::new)
                .map_err(|e| ConfigError::Invalid {
                    var: ENV_STARTING_BUDGET,
                    value: raw.clone(),
                    reason: e.to_string(),
                })?,
            None => Money::new(DEFAULT_STARTING_BUDGET),
        };

        Ok(Self {
            bind_addr,
            starting_budget,
            seed_file: get(ENV_SEED_FILE).map(PathBuf::from),
        })
    }
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            starting_budget: Money::new(DEFAULT_STARTING_BUDGET),
            seed_file: None,
        }
    }
}
