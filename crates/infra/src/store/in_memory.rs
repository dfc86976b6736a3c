use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, RwLock};

use bazaar_core::UserId;
use bazaar_market::{Item, ItemId, User};

use super::r#trait::{MarketStore, StoreError};

type Cell<T> = Arc<Mutex<T>>;

#[derive(Debug, Default)]
struct Indexes {
    users: HashMap<UserId, Cell<User>>,
    usernames: HashMap<String, UserId>,
    emails: HashSet<String>,
    items: HashMap<String, Cell<Item>>,
    item_ids: HashSet<ItemId>,
    barcodes: HashSet<String>,
}

/// In-memory marketplace store.
///
/// Index maps sit behind one `RwLock` that is only held long enough to find
/// or insert a record. Each user and item lives in its own `Mutex`, so a trade
/// serializes against other trades touching the same user or item and
/// nothing else.
#[derive(Debug, Default)]
pub struct InMemoryMarketStore {
    indexes: RwLock<Indexes>,
}

impl InMemoryMarketStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn snapshot<T: Clone>(cell: &Cell<T>) -> Result<T, StoreError> {
        cell.lock()
            .map(|guard| guard.clone())
            .map_err(|_| StoreError::Poisoned)
    }

    fn all_items(&self) -> Result<Vec<Item>, StoreError> {
        let cells: Vec<Cell<Item>> = {
            let idx = self.indexes.read().map_err(|_| StoreError::Poisoned)?;
            idx.items.values().cloned().collect()
        };

        let mut items = cells
            .iter()
            .map(Self::snapshot)
            .collect::<Result<Vec<_>, _>>()?;
        items.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(items)
    }
}

impl MarketStore for InMemoryMarketStore {
    fn insert_user(&self, user: User) -> Result<(), StoreError> {
        let mut idx = self.indexes.write().map_err(|_| StoreError::Poisoned)?;

        if idx.users.contains_key(&user.id_typed()) {
            return Err(StoreError::Duplicate {
                field: "user id",
                value: user.id_typed().to_string(),
            });
        }
        if idx.usernames.contains_key(user.username()) {
            return Err(StoreError::Duplicate {
                field: "username",
                value: user.username().to_string(),
            });
        }
        if idx.emails.contains(user.email()) {
            return Err(StoreError::Duplicate {
                field: "email",
                value: user.email().to_string(),
            });
        }

        idx.usernames.insert(user.username().to_string(), user.id_typed());
        idx.emails.insert(user.email().to_string());
        idx.users.insert(user.id_typed(), Arc::new(Mutex::new(user)));
        Ok(())
    }

    fn insert_item(&self, item: Item) -> Result<(), StoreError> {
        let mut idx = self.indexes.write().map_err(|_| StoreError::Poisoned)?;

        if idx.item_ids.contains(&item.id_typed()) {
            return Err(StoreError::Duplicate {
                field: "item id",
                value: item.id_typed().to_string(),
            });
        }
        if idx.items.contains_key(item.name()) {
            return Err(StoreError::Duplicate {
                field: "item name",
                value: item.name().to_string(),
            });
        }
        if idx.barcodes.contains(item.barcode()) {
            return Err(StoreError::Duplicate {
                field: "barcode",
                value: item.barcode().to_string(),
            });
        }

        idx.item_ids.insert(item.id_typed());
        idx.barcodes.insert(item.barcode().to_string());
        idx.items
            .insert(item.name().to_string(), Arc::new(Mutex::new(item)));
        Ok(())
    }

    fn user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let cell = {
            let idx = self.indexes.read().map_err(|_| StoreError::Poisoned)?;
            idx.users.get(&id).cloned()
        };
        cell.as_ref().map(Self::snapshot).transpose()
    }

    fn user_by_name(&self, username: &str) -> Result<Option<User>, StoreError> {
        let cell = {
            let idx = self.indexes.read().map_err(|_| StoreError::Poisoned)?;
            idx.usernames
                .get(username)
                .and_then(|id| idx.users.get(id))
                .cloned()
        };
        cell.as_ref().map(Self::snapshot).transpose()
    }

    fn item_by_name(&self, name: &str) -> Result<Option<Item>, StoreError> {
        let cell = {
            let idx = self.indexes.read().map_err(|_| StoreError::Poisoned)?;
            idx.items.get(name).cloned()
        };
        cell.as_ref().map(Self::snapshot).transpose()
    }

    fn listed_items(&self) -> Result<Vec<Item>, StoreError> {
        let mut items = self.all_items()?;
        items.retain(|item| item.ownership().is_listed());
        Ok(items)
    }

    fn items_owned_by(&self, user: UserId) -> Result<Vec<Item>, StoreError> {
        let mut items = self.all_items()?;
        items.retain(|item| item.ownership().is_owned_by(user));
        Ok(items)
    }

    fn item_count(&self) -> Result<usize, StoreError> {
        let idx = self.indexes.read().map_err(|_| StoreError::Poisoned)?;
        Ok(idx.items.len())
    }

    fn transact<T, E, F>(&self, user_id: UserId, item_name: &str, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut User, &mut Item) -> Result<T, E>,
        E: From<StoreError>,
    {
        let (user_cell, item_cell) = {
            let idx = self.indexes.read().map_err(|_| StoreError::Poisoned)?;
            let user = idx
                .users
                .get(&user_id)
                .cloned()
                .ok_or_else(|| StoreError::UserNotFound(user_id.to_string()))?;
            let item = idx
                .items
                .get(item_name)
                .cloned()
                .ok_or_else(|| StoreError::ItemNotFound(item_name.to_string()))?;
            (user, item)
        };

        // Lock order: user, then item.
        let mut user = user_cell.lock().map_err(|_| StoreError::Poisoned)?;
        let mut item = item_cell.lock().map_err(|_| StoreError::Poisoned)?;

        let mut user_draft = user.clone();
        let mut item_draft = item.clone();
        let out = f(&mut user_draft, &mut item_draft)?;

        *user = user_draft;
        *item = item_draft;
        Ok(out)
    }
}
