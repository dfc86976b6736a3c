//! Records with identity that outlive any single change.

pub trait Entity {
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> &Self::Id;

    /// Starts at 1 and grows by one with each committed change.
    fn version(&self) -> u64;
}
