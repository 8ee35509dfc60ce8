//! Leaderboard Cache
//!
//! Leaderboards are parameterized by category and period, so the key is built
//! per call: `leaderboard:{category}:{period}`. Their TTL is configured apart
//! from the domain facades.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::cache::{composite_key, TtlCache, KEY_DELIMITER};
use crate::error::Result;

/// Key namespace shared by every leaderboard entry
pub const LEADERBOARD_NAMESPACE: &str = "leaderboard";

/// Period used when the caller does not name one
pub const DEFAULT_PERIOD: &str = "week";

// == Leaderboard Cache ==
#[derive(Clone, Debug)]
pub struct LeaderboardCache {
    cache: TtlCache,
    ttl: Duration,
}

impl LeaderboardCache {
    pub fn new(cache: TtlCache, ttl: Duration) -> Self {
        Self { cache, ttl }
    }

    // == Key ==
    /// Builds the cache key, substituting [`DEFAULT_PERIOD`] first so that an
    /// omitted period and an explicit `"week"` share one entry.
    pub fn key(category: &str, period: Option<&str>) -> Result<String> {
        let period = period.unwrap_or(DEFAULT_PERIOD);
        composite_key(&[LEADERBOARD_NAMESPACE, category, period])
    }

    // == Get ==
    /// Returns the leaderboard for `category` and `period`.
    ///
    /// `loader` receives the resolved category and period. Invalid dimensions
    /// fail before the cache is consulted.
    pub async fn get<T, L, F>(&self, category: &str, period: Option<&str>, loader: L) -> Result<Arc<T>>
    where
        T: Serialize + Send + Sync + 'static,
        L: FnOnce(String, String) -> F + Send + 'static,
        F: Future<Output = anyhow::Result<T>> + Send + 'static,
    {
        let key = Self::key(category, period)?;
        let category = category.to_string();
        let period = period.unwrap_or(DEFAULT_PERIOD).to_string();

        self.cache.get(&key, self.ttl, move || loader(category, period)).await
    }

    // == Clear ==
    /// Invalidates one leaderboard.
    pub fn clear(&self, category: &str, period: Option<&str>) -> Result<bool> {
        let key = Self::key(category, period)?;
        Ok(self.cache.invalidate(&key))
    }

    /// Invalidates every cached leaderboard. Returns how many were dropped.
    pub fn clear_all(&self) -> usize {
        let prefix = format!("{}{}", LEADERBOARD_NAMESPACE, KEY_DELIMITER);
        self.cache.invalidate_matching(|key| key.starts_with(&prefix))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}
