//! Text utilities for roomscribe.

pub mod unicode;

pub use unicode::{preview, single_line, truncate_graphemes};
