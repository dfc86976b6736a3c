use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bazaar_core::{Money, UserId};
use bazaar_events::Event;

use crate::item::ItemId;

/// Event: UserRegistered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRegistered {
    pub user_id: UserId,
    pub username: String,
    pub budget: Money,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ItemListed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemListed {
    pub item_id: ItemId,
    pub name: String,
    pub price: Money,
    pub barcode: String,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ItemPurchased.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemPurchased {
    pub user_id: UserId,
    pub item_id: ItemId,
    pub item_name: String,
    pub price: Money,
    pub new_budget: Money,
    /// The user's version after this trade; orders one user's trades.
    pub user_version: u64,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ItemSold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSold {
    pub user_id: UserId,
    pub item_id: ItemId,
    pub item_name: String,
    pub price: Money,
    pub new_budget: Money,
    /// The user's version after this trade; orders one user's trades.
    pub user_version: u64,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum MarketEvent {
    UserRegistered(UserRegistered),
    ItemListed(ItemListed),
    ItemPurchased(ItemPurchased),
    ItemSold(ItemSold),
}

impl Event for MarketEvent {
    fn event_type(&self) -> &'static str {
        match self {
            MarketEvent::UserRegistered(_) => "market.user.registered",
            MarketEvent::ItemListed(_) => "market.item.listed",
            MarketEvent::ItemPurchased(_) => "market.item.purchased",
            MarketEvent::ItemSold(_) => "market.item.sold",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            MarketEvent::UserRegistered(e) => e.occurred_at,
            MarketEvent::ItemListed(e) => e.occurred_at,
            MarketEvent::ItemPurchased(e) => e.occurred_at,
            MarketEvent::ItemSold(e) => e.occurred_at,
        }
    }
}
