//! Request DTOs for the cache service API
//!
//! Defines the structure of incoming request bodies and query strings.

use serde::Deserialize;

/// Request body for pattern invalidation (POST /cache/invalidate)
///
/// # Fields
/// - `pattern`: Regular expression matched against every stored key
#[derive(Debug, Clone, Deserialize)]
pub struct InvalidatePatternRequest {
    /// The key pattern
    pub pattern: String,
}

impl InvalidatePatternRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.pattern.is_empty() {
            return Some("Pattern cannot be empty".to_string());
        }
        None
    }
}

/// Query string for GET /leaderboard/:category
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeaderboardQuery {
    /// Ranking period, defaults to a week
    #[serde(default)]
    pub period: Option<String>,
}

impl LeaderboardQuery {
    /// The requested period, treating `?period=` as absent.
    pub fn period(&self) -> Option<&str> {
        self.period.as_deref().filter(|p| !p.is_empty())
    }
}

/// Query string for GET /cache/stats
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatsQuery {
    /// How many top keys to report
    #[serde(default)]
    pub top: Option<usize>,
}
