//! Purchase/sale request handling.
//!
//! ```text
//! TradeIntent
//!   ↓
//! 1. Resolve the acting user by handle
//!   ↓
//! 2. store.transact(user, item): apply the ledger rule to the locked pair
//!   ↓
//! 3. Publish the resulting fact (after commit)
//!   ↓
//! TradeReceipt | DispatchError
//! ```
//!
//! The handler owns no business logic beyond resolving names to records;
//! every decision is made by `bazaar_market::ledger`.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use bazaar_core::Money;
use bazaar_events::{EventBus, EventEnvelope};
use bazaar_market::{Item, MarketEvent, TradeError, TradeKind, User, ledger};

use crate::error::DispatchError;
use crate::publish::{ITEM_STREAM, publish_committed};
use crate::store::MarketStore;

/// A purchase-or-sale request from an already authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeIntent {
    /// Handle of the acting user.
    pub actor: String,
    pub item_name: String,
    pub kind: TradeKind,
}

impl TradeIntent {
    pub fn purchase(actor: impl Into<String>, item_name: impl Into<String>) -> Self {
        Self {
            actor: actor.into(),
            item_name: item_name.into(),
            kind: TradeKind::Purchase,
        }
    }

    pub fn sale(actor: impl Into<String>, item_name: impl Into<String>) -> Self {
        Self {
            actor: actor.into(),
            item_name: item_name.into(),
            kind: TradeKind::Sale,
        }
    }
}

/// Successful outcome of a trade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeReceipt {
    pub item_name: String,
    pub price: Money,
    pub new_budget: Money,
}

/// Applies trade intents against a store and announces the results on a bus.
#[derive(Debug)]
pub struct TradeDispatcher<S, B> {
    store: S,
    bus: B,
}

impl<S, B> TradeDispatcher<S, B> {
    pub fn new(store: S, bus: B) -> Self {
        Self { store, bus }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }
}

impl<S, B> TradeDispatcher<S, B>
where
    S: MarketStore,
    B: EventBus<EventEnvelope<MarketEvent>>,
{
    pub fn handle(&self, intent: &TradeIntent) -> Result<TradeReceipt, DispatchError> {
        let kind = intent.kind.as_str();

        let actor = self
            .store
            .user_by_name(&intent.actor)?
            .ok_or_else(|| DispatchError::UnknownActor(intent.actor.clone()))?;

        let outcome = self
            .store
            .transact(actor.id_typed(), &intent.item_name, |user, item| {
                let transfer = match intent.kind {
                    TradeKind::Purchase => ledger::purchase(user, item)?,
                    TradeKind::Sale => ledger::sell(user, item)?,
                };
                // Stamped under the user lock so one user's trades keep commit order.
                Ok::<_, DispatchError>((transfer, Utc::now()))
            });

        let (transfer, committed_at) = match outcome {
            Ok(committed) => committed,
            Err(DispatchError::Store(err)) => {
                error!(kind, actor = %intent.actor, item = %intent.item_name, error = %err, "trade failed in store");
                return Err(DispatchError::Store(err));
            }
            Err(err) => {
                warn!(kind, actor = %intent.actor, item = %intent.item_name, reason = %err, "trade rejected");
                return Err(err);
            }
        };

        let receipt = TradeReceipt {
            item_name: transfer.item_name.clone(),
            price: transfer.price,
            new_budget: transfer.new_budget,
        };

        info!(
            kind,
            actor = %intent.actor,
            item = %receipt.item_name,
            price = receipt.price.amount(),
            new_budget = receipt.new_budget.amount(),
            "trade committed"
        );

        let item_id = transfer.item_id;
        let sequence = transfer.item_version;
        publish_committed(
            &self.bus,
            item_id.0,
            ITEM_STREAM,
            sequence,
            transfer.into_event(committed_at),
        );

        Ok(receipt)
    }

    /// Whether `actor` could buy `item_name` right now (advisory; not a reservation).
    pub fn can_purchase(&self, actor: &str, item_name: &str) -> Result<bool, DispatchError> {
        let (user, item) = self.resolve(actor, item_name)?;
        Ok(ledger::can_purchase(&user, &item))
    }

    /// Whether `actor` could sell `item_name` right now (advisory).
    pub fn can_sell(&self, actor: &str, item_name: &str) -> Result<bool, DispatchError> {
        let (user, item) = self.resolve(actor, item_name)?;
        Ok(ledger::can_sell(&user, &item))
    }

    fn resolve(
        &self,
        actor: &str,
        item_name: &str,
    ) -> Result<(User, Item), DispatchError> {
        let user = self
            .store
            .user_by_name(actor)?
            .ok_or_else(|| DispatchError::UnknownActor(actor.to_string()))?;
        let item = self.store.item_by_name(item_name)?.ok_or_else(|| {
            DispatchError::Trade(TradeError::ItemNotFound {
                name: item_name.to_string(),
            })
        })?;
        Ok((user, item))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use bazaar_core::Entity;
    use bazaar_events::InMemoryEventBus;
    use bazaar_market::{NewItem, Ownership, RegisterUser};

    use super::*;
    use crate::projections::TradeHistoryProjection;
    use crate::store::InMemoryMarketStore;

    type Bus = Arc<InMemoryEventBus<EventEnvelope<MarketEvent>>>;

    fn setup() -> TradeDispatcher<InMemoryMarketStore, Bus> {
        let store = InMemoryMarketStore::new();
        for (name, budget) in [("Alice", 100), ("Bob", 100)] {
            let user = User::register(
                &RegisterUser {
                    username: name.to_string(),
                    email: format!("{}@example.com", name.to_lowercase()),
                },
                Money::new(budget),
            )
            .unwrap();
            store.insert_user(user).unwrap();
        }
        let sword = Item::list(&NewItem {
            name: "Sword".to_string(),
            price: Money::new(40),
            barcode: "000000000040".to_string(),
            description: String::new(),
        })
        .unwrap();
        store.insert_item(sword).unwrap();

        TradeDispatcher::new(store, Arc::new(InMemoryEventBus::new()))
    }

    #[test]
    fn purchase_then_competing_purchase() {
        let d = setup();

        let receipt = d.handle(&TradeIntent::purchase("Alice", "Sword")).unwrap();
        assert_eq!(
            receipt,
            TradeReceipt {
                item_name: "Sword".to_string(),
                price: Money::new(40),
                new_budget: Money::new(60),
            }
        );

        let err = d.handle(&TradeIntent::purchase("Bob", "Sword")).unwrap_err();
        assert_eq!(
            err,
            DispatchError::Trade(TradeError::AlreadyOwned {
                name: "Sword".to_string()
            })
        );
    }

    #[test]
    fn sale_restores_budget_and_listing() {
        let d = setup();
        d.handle(&TradeIntent::purchase("Alice", "Sword")).unwrap();

        let err = d.handle(&TradeIntent::sale("Bob", "Sword")).unwrap_err();
        assert!(matches!(err, DispatchError::Trade(TradeError::NotOwner { .. })));

        let receipt = d.handle(&TradeIntent::sale("Alice", "Sword")).unwrap();
        assert_eq!(receipt.price, Money::new(40));
        assert_eq!(receipt.new_budget, Money::new(100));

        let sword = d.store().item_by_name("Sword").unwrap().unwrap();
        assert_eq!(sword.ownership(), Ownership::Listed);
    }

    #[test]
    fn unknown_item_is_reported_not_ignored() {
        let d = setup();
        let err = d.handle(&TradeIntent::purchase("Alice", "Shield")).unwrap_err();
        assert_eq!(
            err,
            DispatchError::Trade(TradeError::ItemNotFound {
                name: "Shield".to_string()
            })
        );
        assert!(d.can_purchase("Alice", "Shield").is_err());
    }

    #[test]
    fn unknown_actor_is_rejected() {
        let d = setup();
        let err = d.handle(&TradeIntent::purchase("Mallory", "Sword")).unwrap_err();
        assert_eq!(err, DispatchError::UnknownActor("Mallory".to_string()));
    }

    #[test]
    fn insufficient_funds_changes_nothing() {
        let d = setup();
        let store = d.store();
        let poor = User::register(
            &RegisterUser {
                username: "Poor".to_string(),
                email: "poor@example.com".to_string(),
            },
            Money::new(10),
        )
        .unwrap();
        store.insert_user(poor).unwrap();

        assert!(!d.can_purchase("Poor", "Sword").unwrap());
        let err = d.handle(&TradeIntent::purchase("Poor", "Sword")).unwrap_err();
        assert_eq!(
            err,
            DispatchError::Trade(TradeError::InsufficientFunds {
                price: Money::new(40),
                budget: Money::new(10),
            })
        );

        let poor = store.user_by_name("Poor").unwrap().unwrap();
        assert_eq!(poor.budget(), Money::new(10));
        assert_eq!(poor.version(), 1);
        assert!(store.item_by_name("Sword").unwrap().unwrap().ownership().is_listed());
    }

    #[test]
    fn committed_trades_are_published_in_item_stream_order() {
        let d = setup();
        let sub = d.bus().subscribe();

        d.handle(&TradeIntent::purchase("Alice", "Sword")).unwrap();
        d.handle(&TradeIntent::purchase("Bob", "Sword")).unwrap_err();
        d.handle(&TradeIntent::sale("Alice", "Sword")).unwrap();

        let first = sub.try_recv().unwrap();
        assert_eq!(first.aggregate_type(), ITEM_STREAM);
        assert_eq!(first.sequence_number(), 2);
        assert!(matches!(first.payload(), MarketEvent::ItemPurchased(_)));

        let second = sub.try_recv().unwrap();
        assert_eq!(second.sequence_number(), 3);
        assert!(matches!(second.payload(), MarketEvent::ItemSold(_)));

        // The rejected purchase produced nothing.
        assert!(sub.try_recv().is_err());
    }

    #[test]
    fn concurrent_sales_by_the_owner_credit_once() {
        let d = setup();
        d.handle(&TradeIntent::purchase("Alice", "Sword")).unwrap();

        let results: Vec<_> = thread::scope(|s| {
            let handles: Vec<_> = (0..16)
                .map(|_| s.spawn(|| d.handle(&TradeIntent::sale("Alice", "Sword"))))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let sold = results.iter().filter(|r| r.is_ok()).count();
        let not_owner = results
            .iter()
            .filter(|r| matches!(r, Err(DispatchError::Trade(TradeError::NotOwner { .. }))))
            .count();
        assert_eq!(sold, 1);
        assert_eq!(not_owner, 15);

        let alice = d.store().user_by_name("Alice").unwrap().unwrap();
        assert_eq!(alice.budget(), Money::new(100));
        assert_eq!(alice.version(), 3);
        assert!(d.store().item_by_name("Sword").unwrap().unwrap().ownership().is_listed());
    }

    #[test]
    fn one_users_concurrent_trades_keep_commit_order_in_history() {
        let d = setup();
        let store = d.store();
        let hoarder = User::register(
            &RegisterUser {
                username: "Hoarder".to_string(),
                email: "hoarder@example.com".to_string(),
            },
            Money::new(64),
        )
        .unwrap();
        let hoarder_id = hoarder.id_typed();
        store.insert_user(hoarder).unwrap();
        for n in 0..64 {
            let gem = Item::list(&NewItem {
                name: format!("Gem {n}"),
                price: Money::new(1),
                barcode: format!("{:012}", 1000 + n),
                description: String::new(),
            })
            .unwrap();
            store.insert_item(gem).unwrap();
        }
        let sub = d.bus().subscribe();

        thread::scope(|s| {
            for t in 0..8 {
                let d = &d;
                s.spawn(move || {
                    for n in 0..8 {
                        let name = format!("Gem {}", t * 8 + n);
                        d.handle(&TradeIntent::purchase("Hoarder", name)).unwrap();
                    }
                });
            }
        });

        let mut envelopes = Vec::new();
        while let Ok(env) = sub.try_recv() {
            envelopes.push(env);
        }
        assert_eq!(envelopes.len(), 64);

        // Arrival order must not matter.
        let projection = TradeHistoryProjection::new();
        for env in envelopes.iter().rev() {
            projection.apply_envelope(env).unwrap();
        }

        let history = projection.history(hoarder_id).unwrap();
        let budgets: Vec<u64> = history.iter().map(|r| r.new_budget.amount()).collect();
        assert_eq!(budgets, (0..64).rev().collect::<Vec<u64>>());
        assert!(history.windows(2).all(|w| w[0].occurred_at <= w[1].occurred_at));
    }

    #[test]
    fn can_sell_tracks_ownership() {
        let d = setup();
        assert!(!d.can_sell("Alice", "Sword").unwrap());
        d.handle(&TradeIntent::purchase("Alice", "Sword")).unwrap();
        assert!(d.can_sell("Alice", "Sword").unwrap());
        assert!(!d.can_sell("Bob", "Sword").unwrap());
    }
}
