//! Per-room bounded message buffers.
//!
//! [`RoomBuffer`] is a fixed-capacity ring with duplicate-id suppression;
//! [`BufferRegistry`] creates one lazily per room and never removes it.

mod registry;
mod room;
mod state;

pub use registry::BufferRegistry;
pub use room::RoomBuffer;
pub use state::AddOutcome;

/// Default per-room capacity.
pub const DEFAULT_CAPACITY: usize = 200;
