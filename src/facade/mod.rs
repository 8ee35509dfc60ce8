//! Facade Module
//!
//! Narrow, per-domain views over the shared [`TtlCache`](crate::cache::TtlCache).

mod domain;
mod leaderboard;
mod registry;

pub use domain::Facade;
pub use leaderboard::{LeaderboardCache, DEFAULT_PERIOD, LEADERBOARD_NAMESPACE};
pub use registry::{DomainCaches, ARENAS_KEY, CHALLENGES_KEY, LEADERBOARD_DOMAIN, QUESTS_KEY};
