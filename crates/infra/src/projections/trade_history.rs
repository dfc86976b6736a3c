//! Per-user trade history, built from published market events.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use bazaar_core::{Money, UserId};
use bazaar_events::EventEnvelope;
use bazaar_market::{ItemId, MarketEvent, TradeKind};

/// One committed trade as seen by the acting user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TradeRecord {
    pub event_id: Uuid,
    pub kind: TradeKind,
    pub item_id: ItemId,
    pub item_name: String,
    pub price: Money,
    pub new_budget: Money,
    /// The user's version after the trade.
    pub user_version: u64,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TradeHistoryError {
    #[error("trade history lock poisoned")]
    Poisoned,
}

#[derive(Debug, Default)]
struct HistoryState {
    seen: HashSet<Uuid>,
    by_user: HashMap<UserId, Vec<TradeRecord>>,
}

/// Disposable read model; rebuildable by replaying envelopes.
///
/// Deduplicates on `event_id`, so redelivery is harmless. Envelopes may
/// arrive out of commit order when trades run concurrently; records are
/// ordered by the user's version at query time.
#[derive(Debug, Default)]
pub struct TradeHistoryProjection {
    state: RwLock<HistoryState>,
}

impl TradeHistoryProjection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one envelope. Returns `true` when it added a record.
    pub fn apply_envelope(
        &self,
        envelope: &EventEnvelope<MarketEvent>,
    ) -> Result<bool, TradeHistoryError> {
        let (user_id, record) = match envelope.payload() {
            MarketEvent::ItemPurchased(e) => (
                e.user_id,
                TradeRecord {
                    event_id: envelope.event_id(),
                    kind: TradeKind::Purchase,
                    item_id: e.item_id,
                    item_name: e.item_name.clone(),
                    price: e.price,
                    new_budget: e.new_budget,
                    user_version: e.user_version,
                    occurred_at: e.occurred_at,
                },
            ),
            MarketEvent::ItemSold(e) => (
                e.user_id,
                TradeRecord {
                    event_id: envelope.event_id(),
                    kind: TradeKind::Sale,
                    item_id: e.item_id,
                    item_name: e.item_name.clone(),
                    price: e.price,
                    new_budget: e.new_budget,
                    user_version: e.user_version,
                    occurred_at: e.occurred_at,
                },
            ),
            MarketEvent::UserRegistered(_) | MarketEvent::ItemListed(_) => return Ok(false),
        };

        let mut state = self.state.write().map_err(|_| TradeHistoryError::Poisoned)?;
        if !state.seen.insert(record.event_id) {
            return Ok(false);
        }
        state.by_user.entry(user_id).or_default().push(record);
        Ok(true)
    }

    /// Trades by `user_id` in commit order.
    pub fn history(&self, user_id: UserId) -> Result<Vec<TradeRecord>, TradeHistoryError> {
        let state = self.state.read().map_err(|_| TradeHistoryError::Poisoned)?;
        let mut records = state.by_user.get(&user_id).cloned().unwrap_or_default();
        records.sort_by_key(|r| r.user_version);
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use bazaar_core::AggregateId;
    use bazaar_market::{ItemPurchased, ItemSold, UserRegistered};

    use super::*;

    fn purchased(user_id: UserId, item_id: ItemId, at: DateTime<Utc>) -> EventEnvelope<MarketEvent> {
        EventEnvelope::new(
            Uuid::now_v7(),
            item_id.0,
            "market.item",
            2,
            MarketEvent::ItemPurchased(ItemPurchased {
                user_id,
                item_id,
                item_name: "Sword".to_string(),
                price: Money::new(40),
                new_budget: Money::new(60),
                user_version: 2,
                occurred_at: at,
            }),
        )
    }

    fn sold(user_id: UserId, item_id: ItemId, at: DateTime<Utc>) -> EventEnvelope<MarketEvent> {
        EventEnvelope::new(
            Uuid::now_v7(),
            item_id.0,
            "market.item",
            3,
            MarketEvent::ItemSold(ItemSold {
                user_id,
                item_id,
                item_name: "Sword".to_string(),
                price: Money::new(40),
                new_budget: Money::new(100),
                user_version: 3,
                occurred_at: at,
            }),
        )
    }

    #[test]
    fn records_trades_per_user_in_commit_order() {
        let projection = TradeHistoryProjection::new();
        let alice = UserId::new();
        let sword = ItemId::new(AggregateId::new());
        let t0 = Utc::now();

        // Delivered out of order.
        assert!(projection.apply_envelope(&sold(alice, sword, t0 + Duration::seconds(1))).unwrap());
        assert!(projection.apply_envelope(&purchased(alice, sword, t0)).unwrap());

        let history = projection.history(alice).unwrap();
        let kinds: Vec<_> = history.iter().map(|r| r.kind).collect();
        assert_eq!(kinds, [TradeKind::Purchase, TradeKind::Sale]);
        assert_eq!(history[1].new_budget, Money::new(100));

        assert!(projection.history(UserId::new()).unwrap().is_empty());
    }

    #[test]
    fn user_version_orders_records_even_when_clocks_disagree() {
        let projection = TradeHistoryProjection::new();
        let alice = UserId::new();
        let sword = ItemId::new(AggregateId::new());
        let t0 = Utc::now();

        // The later trade carries the earlier timestamp.
        projection.apply_envelope(&purchased(alice, sword, t0)).unwrap();
        projection.apply_envelope(&sold(alice, sword, t0 - Duration::seconds(1))).unwrap();

        let versions: Vec<_> = projection.history(alice).unwrap().iter().map(|r| r.user_version).collect();
        assert_eq!(versions, [2, 3]);
    }

    #[test]
    fn redelivery_is_ignored() {
        let projection = TradeHistoryProjection::new();
        let alice = UserId::new();
        let env = purchased(alice, ItemId::new(AggregateId::new()), Utc::now());

        assert!(projection.apply_envelope(&env).unwrap());
        assert!(!projection.apply_envelope(&env).unwrap());
        assert_eq!(projection.history(alice).unwrap().len(), 1);
    }

    #[test]
    fn non_trade_events_are_skipped() {
        let projection = TradeHistoryProjection::new();
        let alice = UserId::new();
        let env = EventEnvelope::new(
            Uuid::now_v7(),
            AggregateId::from(alice),
            "market.user",
            1,
            MarketEvent::UserRegistered(UserRegistered {
                user_id: alice,
                username: "alice".to_string(),
                budget: Money::new(1000),
                occurred_at: Utc::now(),
            }),
        );
        assert!(!projection.apply_envelope(&env).unwrap());
        assert!(projection.history(alice).unwrap().is_empty());
    }
}
