//! Background consumers of the market event bus.

pub mod projection_worker;

pub use projection_worker::{ProjectionWorker, WorkerHandle};
