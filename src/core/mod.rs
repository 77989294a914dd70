//! Core domain models for roomscribe.
//!
//! This module contains the data structures that flow through the pipeline:
//! chat messages going in and snapshots going out to summarizers. These are
//! pure domain models with no I/O or locking.

pub mod message;
pub mod snapshot;

pub use message::{Message, time_label};
pub use snapshot::Snapshot;
