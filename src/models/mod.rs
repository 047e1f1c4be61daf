//! Upstream records and derived analytics payloads.

mod battle;
pub mod lenient;
mod player;
mod stats;

pub use battle::*;
pub use player::*;
pub use stats::*;
