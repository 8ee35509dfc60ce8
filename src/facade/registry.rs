//! Domain Registry
//!
//! Wires one shared cache to the data source: a facade per collection plus
//! the leaderboard cache, each with its configured TTL.

use std::sync::Arc;

use tracing::info;

use crate::cache::TtlCache;
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::facade::{Facade, LeaderboardCache};
use crate::models::{Arena, Challenge, LeaderboardEntry, Quest};
use crate::source::DataSource;

pub const ARENAS_KEY: &str = "arenas";
pub const CHALLENGES_KEY: &str = "challenges";
pub const QUESTS_KEY: &str = "quests";
pub const LEADERBOARD_DOMAIN: &str = "leaderboard";

// == Domain Caches ==
/// Every cached domain of the service, sharing one [`TtlCache`].
#[derive(Clone)]
pub struct DomainCaches {
    cache: TtlCache,
    source: Arc<dyn DataSource>,
    pub arenas: Facade<Vec<Arena>>,
    pub challenges: Facade<Vec<Challenge>>,
    pub quests: Facade<Vec<Quest>>,
    pub leaderboards: LeaderboardCache,
}

impl DomainCaches {
    // == Constructor ==
    pub fn new(source: Arc<dyn DataSource>, config: &Config) -> Self {
        let cache = TtlCache::new();
        let domain_ttl = config.domain_ttl();

        let arenas = {
            let source = Arc::clone(&source);
            Facade::new(cache.clone(), ARENAS_KEY, domain_ttl, move || {
                let source = Arc::clone(&source);
                async move { source.arenas().await }
            })
        };
        let challenges = {
            let source = Arc::clone(&source);
            Facade::new(cache.clone(), CHALLENGES_KEY, domain_ttl, move || {
                let source = Arc::clone(&source);
                async move { source.challenges().await }
            })
        };
        let quests = {
            let source = Arc::clone(&source);
            Facade::new(cache.clone(), QUESTS_KEY, domain_ttl, move || {
                let source = Arc::clone(&source);
                async move { source.quests().await }
            })
        };

        Self {
            leaderboards: LeaderboardCache::new(cache.clone(), config.leaderboard_ttl()),
            cache,
            source,
            arenas,
            challenges,
            quests,
        }
    }

    /// The cache shared by all domains.
    pub fn cache(&self) -> &TtlCache {
        &self.cache
    }

    // == Leaderboard ==
    /// Cached leaderboard for `category`, defaulting the period to a week.
    pub async fn leaderboard(
        &self,
        category: &str,
        period: Option<&str>,
    ) -> Result<Arc<Vec<LeaderboardEntry>>> {
        let source = Arc::clone(&self.source);
        self.leaderboards
            .get(category, period, move |category, period| async move {
                source.leaderboard(&category, &period).await
            })
            .await
    }

    // == Clear Domain ==
    /// Clears a domain by name. Returns the number of entries dropped.
    pub fn clear_domain(&self, name: &str) -> Result<usize> {
        let removed = match name {
            ARENAS_KEY => usize::from(self.arenas.clear()),
            CHALLENGES_KEY => usize::from(self.challenges.clear()),
            QUESTS_KEY => usize::from(self.quests.clear()),
            LEADERBOARD_DOMAIN => self.leaderboards.clear_all(),
            other => return Err(CacheError::NotFound(format!("Unknown domain '{}'", other))),
        };
        info!(domain = name, removed, "Domain cleared");
        Ok(removed)
    }
}
