//! Data Source Module
//!
//! The backing store the cache shields. Implementations are free to be slow;
//! the cache only ever calls them from its loaders.

mod fixture;

use futures::future::BoxFuture;

use crate::models::{Arena, Challenge, LeaderboardEntry, Quest};

pub use fixture::FixtureSource;

// == Data Source ==
/// Queries the cache knows how to load.
pub trait DataSource: Send + Sync + 'static {
    fn arenas(&self) -> BoxFuture<'_, anyhow::Result<Vec<Arena>>>;

    fn challenges(&self) -> BoxFuture<'_, anyhow::Result<Vec<Challenge>>>;

    fn quests(&self) -> BoxFuture<'_, anyhow::Result<Vec<Quest>>>;

    /// Ranked entries for `category` over `period` (e.g. "week", "month").
    fn leaderboard(
        &self,
        category: &str,
        period: &str,
    ) -> BoxFuture<'_, anyhow::Result<Vec<LeaderboardEntry>>>;
}
