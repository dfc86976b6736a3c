use std::sync::Arc;

use thiserror::Error;

use bazaar_core::UserId;
use bazaar_market::{Item, User};

/// Store operation error.
///
/// These are **infrastructure errors** (uniqueness, lookups, lock health) as
/// opposed to trade rule rejections.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("duplicate {field}: {value:?}")]
    Duplicate { field: &'static str, value: String },

    #[error("user not found: {0}")]
    UserNotFound(String),

    #[error("item not found: {0}")]
    ItemNotFound(String),

    #[error("store lock poisoned")]
    Poisoned,
}

/// Durable home of users and items.
///
/// ## Transactions
///
/// `transact()` is the only mutation path after insertion. It must:
/// - hold exclusive access to exactly one user and one item for the call
/// - run `f` against working copies of both
/// - commit both copies when `f` returns `Ok`, and neither otherwise
///
/// Implementations acquire the user before the item so that two transactions
/// can never wait on each other.
///
/// Listings are sorted by item name.
pub trait MarketStore: Send + Sync {
    fn insert_user(&self, user: User) -> Result<(), StoreError>;

    fn insert_item(&self, item: Item) -> Result<(), StoreError>;

    fn user(&self, id: UserId) -> Result<Option<User>, StoreError>;

    fn user_by_name(&self, username: &str) -> Result<Option<User>, StoreError>;

    fn item_by_name(&self, name: &str) -> Result<Option<Item>, StoreError>;

    fn listed_items(&self) -> Result<Vec<Item>, StoreError>;

    fn items_owned_by(&self, user: UserId) -> Result<Vec<Item>, StoreError>;

    fn item_count(&self) -> Result<usize, StoreError>;

    fn transact<T, E, F>(&self, user_id: UserId, item_name: &str, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut User, &mut Item) -> Result<T, E>,
        E: From<StoreError>;
}

impl<S> MarketStore for Arc<S>
where
    S: MarketStore,
{
    fn insert_user(&self, user: User) -> Result<(), StoreError> {
        (**self).insert_user(user)
    }

    fn insert_item(&self, item: Item) -> Result<(), StoreError> {
        (**self).insert_item(item)
    }

    fn user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        (**self).user(id)
    }

    fn user_by_name(&self, username: &str) -> Result<Option<User>, StoreError> {
        (**self).user_by_name(username)
    }

    fn item_by_name(&self, name: &str) -> Result<Option<Item>, StoreError> {
        (**self).item_by_name(name)
    }

    fn listed_items(&self) -> Result<Vec<Item>, StoreError> {
        (**self).listed_items()
    }

    fn items_owned_by(&self, user: UserId) -> Result<Vec<Item>, StoreError> {
        (**self).items_owned_by(user)
    }

    fn item_count(&self) -> Result<usize, StoreError> {
        (**self).item_count()
    }

    fn transact<T, E, F>(&self, user_id: UserId, item_name: &str, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut User, &mut Item) -> Result<T, E>,
        E: From<StoreError>,
    {
        (**self).transact(user_id, item_name, f)
    }
}
