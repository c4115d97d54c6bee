//! Data models for the Tally score tracker.
//!
//! Wire format follows the original service contract: snake_case fields,
//! RFC 3339 timestamps.

mod export;
mod group;
mod leaderboard;
mod player;
mod session;
mod team;

pub use export::*;
pub use group::*;
pub use leaderboard::*;
pub use player::*;
pub use session::*;
pub use team::*;
