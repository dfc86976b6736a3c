//! Registration of users and listing of inventory.

use chrono::Utc;
use tracing::{debug, info};

use bazaar_core::{AggregateId, Entity, Money};
use bazaar_events::{EventBus, EventEnvelope};
use bazaar_market::{Item, ItemListed, MarketEvent, NewItem, RegisterUser, User, UserRegistered};

use crate::error::DispatchError;
use crate::publish::{ITEM_STREAM, USER_STREAM, publish_committed};
use crate::store::MarketStore;

/// Outcome of seeding an inventory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub listed: usize,
    pub skipped: usize,
}

pub fn register_user<S, B>(
    store: &S,
    bus: &B,
    cmd: &RegisterUser,
    starting_budget: Money,
) -> Result<User, DispatchError>
where
    S: MarketStore,
    B: EventBus<EventEnvelope<MarketEvent>>,
{
    let user = User::register(cmd, starting_budget)?;
    store.insert_user(user.clone())?;

    info!(username = %user.username(), budget = user.budget().amount(), "user registered");

    publish_committed(
        bus,
        AggregateId::from(user.id_typed()),
        USER_STREAM,
        user.version(),
        MarketEvent::UserRegistered(UserRegistered {
            user_id: user.id_typed(),
            username: user.username().to_string(),
            budget: user.budget(),
            occurred_at: Utc::now(),
        }),
    );

    Ok(user)
}

pub fn list_item<S, B>(store: &S, bus: &B, cmd: &NewItem) -> Result<Item, DispatchError>
where
    S: MarketStore,
    B: EventBus<EventEnvelope<MarketEvent>>,
{
    let item = Item::list(cmd)?;
    store.insert_item(item.clone())?;

    info!(item = %item.name(), price = item.price().amount(), "item listed");

    publish_committed(
        bus,
        item.id_typed().0,
        ITEM_STREAM,
        item.version(),
        MarketEvent::ItemListed(ItemListed {
            item_id: item.id_typed(),
            name: item.name().to_string(),
            price: item.price(),
            barcode: item.barcode().to_string(),
            occurred_at: Utc::now(),
        }),
    );

    Ok(item)
}

/// List every seed item whose name is not already in the store.
///
/// Running the same seed twice lists each item once.
pub fn seed_inventory<S, B>(store: &S, bus: &B, items: &[NewItem]) -> Result<SeedReport, DispatchError>
where
    S: MarketStore,
    B: EventBus<EventEnvelope<MarketEvent>>,
{
    let mut report = SeedReport::default();
    for cmd in items {
        if store.item_by_name(&cmd.name)?.is_some() {
            debug!(item = %cmd.name, "seed item already listed");
            report.skipped += 1;
            continue;
        }
        list_item(store, bus, cmd)?;
        report.listed += 1;
    }

    info!(listed = report.listed, skipped = report.skipped, "inventory seeded");
    Ok(report)
}

/// What one user sees on the market page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketView {
    pub user: User,
    pub listed: Vec<Item>,
    pub owned: Vec<Item>,
    pub item_count: usize,
}

pub fn market_view<S>(store: &S, actor: &str) -> Result<MarketView, DispatchError>
where
    S: MarketStore,
{
    let user = store
        .user_by_name(actor)?
        .ok_or_else(|| DispatchError::UnknownActor(actor.to_string()))?;

    Ok(MarketView {
        listed: store.listed_items()?,
        owned: store.items_owned_by(user.id_typed())?,
        item_count: store.item_count()?,
        user,
    })
}
