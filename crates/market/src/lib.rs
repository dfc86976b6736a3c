//! Marketplace domain module.
//!
//! Users hold budgets, items carry an explicit ownership state, and the
//! `ledger` moves money and ownership together. Everything here is
//! deterministic domain logic (no IO, no HTTP, no storage).

pub mod events;
pub mod item;
pub mod ledger;
pub mod user;

pub use events::{ItemListed, ItemPurchased, ItemSold, MarketEvent, UserRegistered};
pub use item::{Item, ItemId, NewItem, Ownership};
pub use ledger::{TradeError, TradeKind, Transfer, can_purchase, can_sell, purchase, sell};
pub use user::{RegisterUser, User};
