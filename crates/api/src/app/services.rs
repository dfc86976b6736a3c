use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use bazaar_core::Money;
use bazaar_events::{EventEnvelope, InMemoryEventBus};
use bazaar_infra::projections::{TradeHistoryProjection, TradeRecord};
use bazaar_infra::seed::{default_inventory, load_seed_file};
use bazaar_infra::workers::{ProjectionWorker, WorkerHandle};
use bazaar_infra::{
    DispatchError, InMemoryMarketStore, MarketConfig, MarketStore, MarketView, TradeDispatcher,
    TradeIntent, TradeReceipt, market_view, register_user, seed_inventory,
};
use bazaar_market::{MarketEvent, RegisterUser, User};

use crate::app::errors::ApiError;

pub type MarketBus = InMemoryEventBus<EventEnvelope<MarketEvent>>;
pub type MarketDispatcher = TradeDispatcher<Arc<InMemoryMarketStore>, Arc<MarketBus>>;

/// Everything the handlers need, shared behind one `Arc`.
pub struct AppServices {
    dispatcher: MarketDispatcher,
    history: Arc<TradeHistoryProjection>,
    starting_budget: Money,
    _history_worker: WorkerHandle,
}

impl AppServices {
    /// Wire the store, bus and trade history worker, then list the seed inventory.
    pub fn build(config: &MarketConfig) -> anyhow::Result<Self> {
        let store = Arc::new(InMemoryMarketStore::new());
        let bus: Arc<MarketBus> = Arc::new(InMemoryEventBus::new());
        let history = Arc::new(TradeHistoryProjection::new());

        // Subscribe before seeding so nothing published at startup is missed.
        let sink = Arc::clone(&history);
        let history_worker = ProjectionWorker::spawn(
            "trade-history",
            &bus,
            move |envelope: EventEnvelope<MarketEvent>| sink.apply_envelope(&envelope).map(|_| ()),
        )
        .context("failed to spawn trade history worker")?;

        let inventory = match &config.seed_file {
            Some(path) => load_seed_file(path)
                .with_context(|| format!("failed to load seed file {}", path.display()))?,
            None => default_inventory(),
        };
        let report = seed_inventory(&store, &bus, &inventory).context("failed to seed inventory")?;

        info!(
            listed = report.listed,
            skipped = report.skipped,
            starting_budget = config.starting_budget.amount(),
            "market services ready"
        );

        Ok(Self {
            dispatcher: TradeDispatcher::new(store, bus),
            history,
            starting_budget: config.starting_budget,
            _history_worker: history_worker,
        })
    }

    pub fn register(&self, cmd: &RegisterUser) -> Result<User, DispatchError> {
        register_user(
            self.dispatcher.store(),
            self.dispatcher.bus(),
            cmd,
            self.starting_budget,
        )
    }

    pub fn trade(&self, intent: &TradeIntent) -> Result<TradeReceipt, DispatchError> {
        self.dispatcher.handle(intent)
    }

    pub fn market_view(&self, actor: &str) -> Result<MarketView, DispatchError> {
        market_view(self.dispatcher.store(), actor)
    }

    pub fn eligibility(&self, actor: &str, item_name: &str) -> Result<(bool, bool), DispatchError> {
        Ok((
            self.dispatcher.can_purchase(actor, item_name)?,
            self.dispatcher.can_sell(actor, item_name)?,
        ))
    }

    /// Trades recorded for `actor` so far. Lags commits slightly.
    pub fn history(&self, actor: &str) -> Result<Vec<TradeRecord>, ApiError> {
        let user = self
            .dispatcher
            .store()
            .user_by_name(actor)
            .map_err(DispatchError::from)?
            .ok_or_else(|| DispatchError::UnknownActor(actor.to_string()))?;

        Ok(self.history.history(user.id_typed())?)
    }
}
