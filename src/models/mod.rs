//! Data models for the game session API.
//!
//! Wire names are camelCase, matching the frontend contract.

mod leaderboard;
mod session;

pub use leaderboard::*;
pub use session::*;
