//! Marketplace repository boundary.
//!
//! The trade handler never touches global state: it is handed a
//! `MarketStore` and performs every read-modify-write through it.

pub mod in_memory;
pub mod r#trait;

pub use in_memory::InMemoryMarketStore;
pub use r#trait::{MarketStore, StoreError};
