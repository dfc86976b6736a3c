//! The ownership/balance transfer rule.
//!
//! A purchase moves `price` from the buyer's budget and makes them the owner;
//! a sale returns `price` to the owner and lists the item again. Each
//! operation checks every precondition before touching either record, so a
//! rejected call leaves both the user and the item exactly as they were.
//!
//! Atomicity with respect to other callers is the store's job: these
//! functions assume they hold the only mutable access to the pair.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use bazaar_core::{Entity, Money, UserId};

use crate::events::{ItemPurchased, ItemSold, MarketEvent};
use crate::item::{Item, ItemId, Ownership};
use crate::user::User;

/// Direction of a trade, seen from the acting user.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeKind {
    Purchase,
    Sale,
}

impl TradeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TradeKind::Purchase => "purchase",
            TradeKind::Sale => "sale",
        }
    }
}

/// Caller-facing trade failure. Never retried automatically.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TradeError {
    #[error("no item named {name:?}")]
    ItemNotFound { name: String },

    #[error("budget {budget} is below price {price}")]
    InsufficientFunds { price: Money, budget: Money },

    #[error("{name:?} already has an owner")]
    AlreadyOwned { name: String },

    #[error("{name:?} is not owned by the seller")]
    NotOwner { name: String },
}

impl TradeError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            TradeError::ItemNotFound { .. } => "item_not_found",
            TradeError::InsufficientFunds { .. } => "insufficient_funds",
            TradeError::AlreadyOwned { .. } => "already_owned",
            TradeError::NotOwner { .. } => "not_owner",
        }
    }
}

/// Record of a committed transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    pub kind: TradeKind,
    pub user_id: UserId,
    pub item_id: ItemId,
    pub item_name: String,
    pub price: Money,
    pub new_budget: Money,
    /// User version after the transfer.
    pub user_version: u64,
    /// Item version after the transfer.
    pub item_version: u64,
}

impl Transfer {
    pub fn into_event(self, occurred_at: DateTime<Utc>) -> MarketEvent {
        match self.kind {
            TradeKind::Purchase => MarketEvent::ItemPurchased(ItemPurchased {
                user_id: self.user_id,
                item_id: self.item_id,
                item_name: self.item_name,
                price: self.price,
                new_budget: self.new_budget,
                user_version: self.user_version,
                occurred_at,
            }),
            TradeKind::Sale => MarketEvent::ItemSold(ItemSold {
                user_id: self.user_id,
                item_id: self.item_id,
                item_name: self.item_name,
                price: self.price,
                new_budget: self.new_budget,
                user_version: self.user_version,
                occurred_at,
            }),
        }
    }
}

pub fn can_purchase(user: &User, item: &Item) -> bool {
    item.ownership().is_listed() && user.budget() >= item.price()
}

pub fn can_sell(user: &User, item: &Item) -> bool {
    item.ownership().is_owned_by(user.id_typed())
}

/// Buy a listed item.
///
/// Ownership is checked before funds: an owned item reports `AlreadyOwned`
/// whatever the caller's budget.
pub fn purchase(user: &mut User, item: &mut Item) -> Result<Transfer, TradeError> {
    if !item.ownership().is_listed() {
        return Err(TradeError::AlreadyOwned {
            name: item.name().to_string(),
        });
    }

    let new_budget = user
        .budget()
        .checked_sub(item.price())
        .ok_or(TradeError::InsufficientFunds {
            price: item.price(),
            budget: user.budget(),
        })?;

    user.set_budget(new_budget);
    item.set_ownership(Ownership::OwnedBy(user.id_typed()));

    Ok(transfer(TradeKind::Purchase, user, item))
}

/// Sell an owned item back to the marketplace for its full price.
pub fn sell(user: &mut User, item: &mut Item) -> Result<Transfer, TradeError> {
    if !can_sell(user, item) {
        return Err(TradeError::NotOwner {
            name: item.name().to_string(),
        });
    }

    user.set_budget(user.budget().saturating_add(item.price()));
    item.set_ownership(Ownership::Listed);

    Ok(transfer(TradeKind::Sale, user, item))
}

fn transfer(kind: TradeKind, user: &User, item: &Item) -> Transfer {
    Transfer {
        kind,
        user_id: user.id_typed(),
        item_id: item.id_typed(),
        item_name: item.name().to_string(),
        price: item.price(),
        new_budget: user.budget(),
        user_version: user.version(),
        item_version: item.version(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::NewItem;
    use crate::user::RegisterUser;
    use bazaar_events::Event;
    use proptest::prelude::*;

    fn user(name: &str, budget: u64) -> User {
        User::register(
            &RegisterUser {
                username: name.to_string(),
                email: format!("{}@example.com", name.to_lowercase()),
            },
            Money::new(budget),
        )
        .unwrap()
    }

    fn item(name: &str, price: u64) -> Item {
        Item::list(&NewItem {
            name: name.to_string(),
            price: Money::new(price),
            barcode: "000000000001".to_string(),
            description: String::new(),
        })
        .unwrap()
    }

    #[test]
    fn alice_buys_the_sword_and_bob_is_turned_away() {
        let mut alice = user("Alice", 100);
        let mut bob = user("Bob", 500);
        let mut sword = item("Sword", 40);

        let t = purchase(&mut alice, &mut sword).unwrap();
        assert_eq!(t.kind, TradeKind::Purchase);
        assert_eq!(t.item_name, "Sword");
        assert_eq!(t.price, Money::new(40));
        assert_eq!(t.new_budget, Money::new(60));
        assert_eq!(sword.ownership(), Ownership::OwnedBy(alice.id_typed()));

        let err = purchase(&mut bob, &mut sword).unwrap_err();
        assert_eq!(
            err,
            TradeError::AlreadyOwned {
                name: "Sword".to_string()
            }
        );
        assert_eq!(bob.budget(), Money::new(500));
    }

    #[test]
    fn alice_sells_the_sword_back() {
        let mut alice = user("Alice", 100);
        let mut sword = item("Sword", 40);
        purchase(&mut alice, &mut sword).unwrap();

        let t = sell(&mut alice, &mut sword).unwrap();
        assert_eq!(t.kind, TradeKind::Sale);
        assert_eq!(t.price, Money::new(40));
        assert_eq!(t.new_budget, Money::new(100));
        assert!(sword.ownership().is_listed());
    }

    #[test]
    fn owner_cannot_buy_their_own_item_again() {
        let mut alice = user("Alice", 100);
        let mut sword = item("Sword", 40);
        purchase(&mut alice, &mut sword).unwrap();

        assert!(!can_purchase(&alice, &sword));
        let err = purchase(&mut alice, &mut sword).unwrap_err();
        assert_eq!(err.code(), "already_owned");
        assert_eq!(alice.budget(), Money::new(60));
    }

    #[test]
    fn exact_budget_is_enough() {
        let mut carol = user("Carol", 40);
        let mut sword = item("Sword", 40);
        assert!(can_purchase(&carol, &sword));
        let t = purchase(&mut carol, &mut sword).unwrap();
        assert_eq!(t.new_budget, Money::ZERO);
    }

    #[test]
    fn selling_a_listed_item_is_not_owner() {
        let mut alice = user("Alice", 100);
        let mut sword = item("Sword", 40);
        assert!(!can_sell(&alice, &sword));
        let err = sell(&mut alice, &mut sword).unwrap_err();
        assert_eq!(err.code(), "not_owner");
    }

    #[test]
    fn rejected_operations_leave_versions_untouched() {
        let mut poor = user("Poor", 10);
        let mut sword = item("Sword", 40);
        let (uv, iv) = (poor.version(), sword.version());

        purchase(&mut poor, &mut sword).unwrap_err();
        sell(&mut poor, &mut sword).unwrap_err();

        assert_eq!(poor.version(), uv);
        assert_eq!(sword.version(), iv);
    }

    #[test]
    fn successful_transfers_bump_both_versions() {
        let mut alice = user("Alice", 100);
        let mut sword = item("Sword", 40);

        let t = purchase(&mut alice, &mut sword).unwrap();
        assert_eq!(alice.version(), 2);
        assert_eq!(sword.version(), 2);
        assert_eq!(t.user_version, 2);
        assert_eq!(t.item_version, 2);

        let t = sell(&mut alice, &mut sword).unwrap();
        assert_eq!(alice.version(), 3);
        assert_eq!(t.user_version, 3);
        assert_eq!(t.item_version, 3);
    }

    #[test]
    fn transfer_becomes_matching_event() {
        let mut alice = user("Alice", 100);
        let mut sword = item("Sword", 40);
        let at = Utc::now();

        let event = purchase(&mut alice, &mut sword).unwrap().into_event(at);
        assert_eq!(event.event_type(), "market.item.purchased");
        assert_eq!(event.occurred_at(), at);
        match event {
            MarketEvent::ItemPurchased(e) => {
                assert_eq!(e.user_id, alice.id_typed());
                assert_eq!(e.new_budget, Money::new(60));
                assert_eq!(e.user_version, alice.version());
            }
            other => panic!("expected ItemPurchased, got {other:?}"),
        }

        let event = sell(&mut alice, &mut sword).unwrap().into_event(at);
        assert_eq!(event.event_type(), "market.item.sold");
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: an affordable listed item transfers ownership and debits
        /// exactly its price.
        #[test]
        fn affordable_purchase_debits_price(price in 1u64..1_000_000, extra in 0u64..1_000_000) {
            let mut u = user("Buyer", price + extra);
            let mut i = item("Gem", price);

            let t = purchase(&mut u, &mut i).unwrap();

            prop_assert_eq!(i.ownership(), Ownership::OwnedBy(u.id_typed()));
            prop_assert_eq!(u.budget(), Money::new(extra));
            prop_assert_eq!(t.new_budget, Money::new(extra));
        }

        /// Property: an unaffordable purchase fails and changes nothing.
        #[test]
        fn unaffordable_purchase_changes_nothing(price in 1u64..1_000_000, short in 1u64..1_000_000) {
            let budget = price.saturating_sub(short);
            let mut u = user("Buyer", budget);
            let mut i = item("Gem", price);
            let (before_user, before_item) = (u.clone(), i.clone());

            let err = purchase(&mut u, &mut i).unwrap_err();

            let is_insufficient = matches!(err, TradeError::InsufficientFunds { .. });
            prop_assert!(is_insufficient);
            prop_assert_eq!(u, before_user);
            prop_assert_eq!(i, before_item);
        }

        /// Property: a non-owner can neither buy nor sell an owned item, and
        /// nothing moves when they try.
        #[test]
        fn strangers_cannot_touch_owned_items(price in 1u64..1_000_000, budget in 0u64..2_000_000) {
            let mut owner = user("Owner", price);
            let mut stranger = user("Stranger", budget);
            let mut i = item("Gem", price);
            purchase(&mut owner, &mut i).unwrap();
            let (before_stranger, before_item) = (stranger.clone(), i.clone());

            let is_owned_err = matches!(
                purchase(&mut stranger, &mut i),
                Err(TradeError::AlreadyOwned { .. })
            );
            prop_assert!(is_owned_err);
            let is_not_owner_err = matches!(
                sell(&mut stranger, &mut i),
                Err(TradeError::NotOwner { .. })
            );
            prop_assert!(is_not_owner_err);
            prop_assert_eq!(stranger, before_stranger);
            prop_assert_eq!(i, before_item);
        }

        /// Property: purchase followed by sale restores budget and listing.
        #[test]
        fn purchase_then_sale_round_trips(price in 1u64..1_000_000, extra in 0u64..1_000_000) {
            let start = price + extra;
            let mut u = user("Trader", start);
            let mut i = item("Gem", price);

            purchase(&mut u, &mut i).unwrap();
            let t = sell(&mut u, &mut i).unwrap();

            prop_assert_eq!(u.budget(), Money::new(start));
            prop_assert_eq!(t.new_budget, Money::new(start));
            prop_assert!(i.ownership().is_listed());
        }
    }
}
