//! Domain records served through the cache.

use serde::{Deserialize, Serialize};

/// A themed arena grouping challenges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    pub id: u32,
    pub name: String,
    pub difficulty: String,
}

/// A single challenge inside an arena.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Challenge {
    pub id: u32,
    pub arena_id: u32,
    pub title: String,
    pub points: u32,
}

/// A multi-step quest with a reward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quest {
    pub id: u32,
    pub title: String,
    pub steps: u32,
    pub reward: u32,
}

/// One ranked row of a leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub player: String,
    pub points: u64,
}
