//! Dispatch of summary requests.
//!
//! Triggered rooms go through a bounded [`DispatchQueue`] to a single
//! [`SummaryWorker`]. Producers never block; the worker processes rooms
//! serially.

mod queue;
mod worker;

pub use queue::{DispatchQueue, DispatchReceiver, EnqueueOutcome};
pub use worker::{Outcome, SummaryWorker, WorkerStats};

/// Default number of pending summary requests.
pub const DEFAULT_QUEUE_CAPACITY: usize = 10;
