//! Infrastructure layer: store, request handling, projections, config.

pub mod config;
pub mod error;
pub mod projections;
pub mod publish;
pub mod registry;
pub mod seed;
pub mod store;
pub mod trade_dispatcher;
pub mod workers;

pub use config::{ConfigError, MarketConfig};
pub use error::DispatchError;
pub use registry::{MarketView, SeedReport, list_item, market_view, register_user, seed_inventory};
pub use store::{InMemoryMarketStore, MarketStore, StoreError};
pub use trade_dispatcher::{TradeDispatcher, TradeIntent, TradeReceipt};
