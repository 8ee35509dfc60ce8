//! Configuration Module
//!
//! Handles loading and managing service configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// TTL in seconds for the arenas/challenges/quests facades
    pub domain_ttl: u64,
    /// TTL in seconds for leaderboards
    pub leaderboard_ttl: u64,
    /// HTTP server port
    pub server_port: u16,
    /// Number of top keys reported by the stats endpoint
    pub stats_top_n: usize,
    /// Simulated latency of the fixture data source in milliseconds
    pub source_latency_ms: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `DOMAIN_TTL_SECS` - Domain facade TTL in seconds (default: 300)
    /// - `LEADERBOARD_TTL_SECS` - Leaderboard TTL in seconds (default: 60)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `STATS_TOP_N` - Top keys in stats output (default: 10)
    /// - `SOURCE_LATENCY_MS` - Fixture source latency in ms (default: 50)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            domain_ttl: env_or("DOMAIN_TTL_SECS", defaults.domain_ttl),
            leaderboard_ttl: env_or("LEADERBOARD_TTL_SECS", defaults.leaderboard_ttl),
            server_port: env_or("SERVER_PORT", defaults.server_port),
            stats_top_n: env_or("STATS_TOP_N", defaults.stats_top_n),
            source_latency_ms: env_or("SOURCE_LATENCY_MS", defaults.source_latency_ms),
        }
    }

    pub fn domain_ttl(&self) -> Duration {
        Duration::from_secs(self.domain_ttl)
    }

    pub fn leaderboard_ttl(&self) -> Duration {
        Duration::from_secs(self.leaderboard_ttl)
    }

    pub fn source_latency(&self) -> Duration {
        Duration::from_millis(self.source_latency_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            domain_ttl: 300,
            leaderboard_ttl: 60,
            server_port: 3000,
            stats_top_n: 10,
            source_latency_ms: 50,
        }
    }
}

/// Parses `name` from the environment, falling back to `default` when unset or invalid.
fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.domain_ttl, 300);
        assert_eq!(config.leaderboard_ttl, 60);
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.stats_top_n, 10);
        assert_eq!(config.source_latency_ms, 50);
    }

    #[test]
    fn test_durations() {
        let config = Config::default();
        assert_eq!(config.domain_ttl(), Duration::from_secs(300));
        assert_eq!(config.leaderboard_ttl(), Duration::from_secs(60));
        assert_eq!(config.source_latency(), Duration::from_millis(50));
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("DOMAIN_TTL_SECS");
        env::remove_var("LEADERBOARD_TTL_SECS");
        env::remove_var("SERVER_PORT");
        env::remove_var("STATS_TOP_N");
        env::remove_var("SOURCE_LATENCY_MS");

        let config = Config::from_env();
        assert_eq!(config.domain_ttl, 300);
        assert_eq!(config.leaderboard_ttl, 60);
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.stats_top_n, 10);
    }

    #[test]
    fn test_env_or_ignores_garbage() {
        env::set_var("FLIGHTCACHE_TEST_GARBAGE", "not-a-number");
        assert_eq!(env_or("FLIGHTCACHE_TEST_GARBAGE", 7u64), 7);
        env::remove_var("FLIGHTCACHE_TEST_GARBAGE");
    }
}
