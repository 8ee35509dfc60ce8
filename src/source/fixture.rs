//! Fixture Data Source
//!
//! In-memory stand-in for the database, with simulated query latency and a
//! query counter so callers can see how much work the cache saved.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use anyhow::{bail, Context};
use futures::future::{BoxFuture, FutureExt};
use tracing::debug;

use crate::models::{Arena, Challenge, LeaderboardEntry, Quest};
use crate::source::DataSource;

/// Raw score row: player, category, period, points.
type ScoreRow = (&'static str, &'static str, &'static str, u64);

const SCORES: &[ScoreRow] = &[
    ("ada", "coding", "week", 420),
    ("linus", "coding", "week", 380),
    ("grace", "coding", "week", 510),
    ("ada", "coding", "month", 1620),
    ("grace", "coding", "month", 1490),
    ("linus", "coding", "month", 1710),
    ("ada", "puzzles", "week", 90),
    ("alan", "puzzles", "week", 140),
    ("alan", "puzzles", "month", 600),
];

// == Fixture Source ==
/// Serves a fixed data set after a configurable delay.
#[derive(Debug)]
pub struct FixtureSource {
    latency: Duration,
    queries: AtomicU64,
    failing: AtomicBool,
}

impl FixtureSource {
    // == Constructor ==
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            queries: AtomicU64::new(0),
            failing: AtomicBool::new(false),
        }
    }

    /// Number of queries executed so far.
    pub fn queries(&self) -> u64 {
        self.queries.load(Ordering::SeqCst)
    }

    /// Makes every following query fail until switched back.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Shared prologue of every query: count, wait, maybe fail.
    async fn query(&self, name: &str) -> anyhow::Result<()> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        debug!(query = name, "Fixture query");

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            bail!("data source unavailable while running '{}'", name);
        }
        Ok(())
    }
}

impl Default for FixtureSource {
    fn default() -> Self {
        Self::new(Duration::ZERO)
    }
}

impl DataSource for FixtureSource {
    fn arenas(&self) -> BoxFuture<'_, anyhow::Result<Vec<Arena>>> {
        async move {
            self.query("arenas").await?;
            Ok(vec![
                Arena { id: 1, name: "Syntax Swamp".into(), difficulty: "easy".into() },
                Arena { id: 2, name: "Borrow Canyon".into(), difficulty: "medium".into() },
                Arena { id: 3, name: "Lifetime Peaks".into(), difficulty: "hard".into() },
            ])
        }
        .boxed()
    }

    fn challenges(&self) -> BoxFuture<'_, anyhow::Result<Vec<Challenge>>> {
        async move {
            self.query("challenges").await?;
            Ok(vec![
                Challenge { id: 10, arena_id: 1, title: "Fizz without Buzz".into(), points: 10 },
                Challenge { id: 11, arena_id: 2, title: "Move it or lose it".into(), points: 25 },
                Challenge { id: 12, arena_id: 3, title: "Outlive the borrow".into(), points: 50 },
            ])
        }
        .boxed()
    }

    fn quests(&self) -> BoxFuture<'_, anyhow::Result<Vec<Quest>>> {
        async move {
            self.query("quests").await?;
            Ok(vec![
                Quest { id: 100, title: "First steps".into(), steps: 3, reward: 50 },
                Quest { id: 101, title: "Arena sweep".into(), steps: 9, reward: 300 },
            ])
        }
        .boxed()
    }

    fn leaderboard(
        &self,
        category: &str,
        period: &str,
    ) -> BoxFuture<'_, anyhow::Result<Vec<LeaderboardEntry>>> {
        let category = category.to_string();
        let period = period.to_string();

        async move {
            self.query("leaderboard")
                .await
                .with_context(|| format!("leaderboard {}/{}", category, period))?;

            let mut rows: Vec<&ScoreRow> = SCORES
                .iter()
                .filter(|(_, c, p, _)| *c == category && *p == period)
                .collect();
            rows.sort_by(|a, b| b.3.cmp(&a.3).then_with(|| a.0.cmp(&b.0)));

            Ok(rows
                .into_iter()
                .zip(1u32..)
                .map(|((player, _, _, points), rank)| LeaderboardEntry {
                    rank,
                    player: player.to_string(),
                    points: *points,
                })
                .collect())
        }
        .boxed()
    }
}
