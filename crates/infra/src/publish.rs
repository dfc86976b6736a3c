//! Post-commit publication of market facts.

use tracing::warn;
use uuid::Uuid;

use bazaar_core::AggregateId;
use bazaar_events::{Event, EventBus, EventEnvelope};
use bazaar_market::MarketEvent;

pub const USER_STREAM: &str = "market.user";
pub const ITEM_STREAM: &str = "market.item";

/// Publish an already-committed event.
///
/// The state change is durable by the time this runs, so a bus failure is
/// logged rather than returned. Returns the envelope's event id.
pub fn publish_committed<B>(
    bus: &B,
    aggregate_id: AggregateId,
    aggregate_type: &'static str,
    sequence_number: u64,
    event: MarketEvent,
) -> Uuid
where
    B: EventBus<EventEnvelope<MarketEvent>>,
{
    let event_id = Uuid::now_v7();
    let event_type = event.event_type();
    let schema_version = event.version();
    let envelope = EventEnvelope::new(event_id, aggregate_id, aggregate_type, sequence_number, event);

    if let Err(err) = bus.publish(envelope) {
        warn!(
            event_type,
            schema_version,
            %aggregate_id,
            sequence_number,
            error = ?err,
            "failed to publish committed event"
        );
    }

    event_id
}
