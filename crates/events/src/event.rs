use chrono::{DateTime, Utc};

/// A committed fact carried on the bus.
///
/// Implementors are plain data; publishing one never changes state.
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Dotted type name, e.g. `market.item.purchased`.
    fn event_type(&self) -> &'static str;

    /// Payload schema revision, bumped when fields change meaning.
    fn version(&self) -> u32;

    fn occurred_at(&self) -> DateTime<Utc>;
}
