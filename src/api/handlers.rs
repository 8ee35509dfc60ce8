//! API Handlers
//!
//! HTTP request handlers: domain reads go through the facades, the `/cache`
//! endpoints expose stats and invalidation.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::cache::TtlCache;
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::facade::{DomainCaches, DEFAULT_PERIOD};
use crate::models::{
    Arena, Challenge, HealthResponse, InvalidatePatternRequest, InvalidateResponse,
    LeaderboardQuery, LeaderboardResponse, Quest, StatsQuery, StatsResponse,
};
use crate::source::{DataSource, FixtureSource};

/// Application state shared across all handlers.
///
/// Cloning is cheap: the domain caches share one cache behind `Arc`s.
#[derive(Clone)]
pub struct AppState {
    /// Cached domains
    pub domains: DomainCaches,
    /// Default number of top keys in stats output
    pub stats_top_n: usize,
}

impl AppState {
    /// Creates a new AppState over the given data source.
    pub fn new(source: Arc<dyn DataSource>, config: &Config) -> Self {
        Self {
            domains: DomainCaches::new(source, config),
            stats_top_n: config.stats_top_n,
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Backs the caches with the in-memory fixture source.
    pub fn from_config(config: &Config) -> Self {
        let source = Arc::new(FixtureSource::new(config.source_latency()));
        Self::new(source, config)
    }

    /// The cache shared by every domain.
    pub fn cache(&self) -> &TtlCache {
        self.domains.cache()
    }
}

/// Handler for GET /arenas
pub async fn arenas_handler(State(state): State<AppState>) -> Result<Json<Arc<Vec<Arena>>>> {
    Ok(Json(state.domains.arenas.get().await?))
}

/// Handler for GET /challenges
pub async fn challenges_handler(
    State(state): State<AppState>,
) -> Result<Json<Arc<Vec<Challenge>>>> {
    Ok(Json(state.domains.challenges.get().await?))
}

/// Handler for GET /quests
pub async fn quests_handler(State(state): State<AppState>) -> Result<Json<Arc<Vec<Quest>>>> {
    Ok(Json(state.domains.quests.get().await?))
}

/// Handler for GET /leaderboard/:category?period=
///
/// The period defaults to a week when omitted or empty.
pub async fn leaderboard_handler(
    State(state): State<AppState>,
    Path(category): Path<String>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<LeaderboardResponse>> {
    let period = query.period();
    let entries = state.domains.leaderboard(&category, period).await?;

    Ok(Json(LeaderboardResponse {
        category,
        period: period.unwrap_or(DEFAULT_PERIOD).to_string(),
        entries,
    }))
}

/// Handler for GET /cache/stats?top=N
pub async fn stats_handler(
    State(state): State<AppState>,
    Query(query): Query<StatsQuery>,
) -> Json<StatsResponse> {
    let top_n = query.top.unwrap_or(state.stats_top_n);
    Json(StatsResponse::from(state.cache().stats(top_n)))
}

/// Handler for DELETE /cache/keys/:key
pub async fn invalidate_key_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Json<InvalidateResponse> {
    let removed = usize::from(state.cache().invalidate(&key));
    Json(InvalidateResponse::new(key, removed))
}

/// Handler for DELETE /cache/domains/:name
pub async fn clear_domain_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<InvalidateResponse>> {
    let removed = state.domains.clear_domain(&name)?;
    Ok(Json(InvalidateResponse::new(name, removed)))
}

/// Handler for POST /cache/invalidate
pub async fn invalidate_pattern_handler(
    State(state): State<AppState>,
    Json(req): Json<InvalidatePatternRequest>,
) -> Result<Json<InvalidateResponse>> {
    // Validate request
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidPattern(error_msg));
    }

    let removed = state.cache().invalidate_pattern(&req.pattern)?;
    Ok(Json(InvalidateResponse::new(req.pattern, removed)))
}

/// Handler for DELETE /cache
pub async fn clear_handler(State(state): State<AppState>) -> Json<InvalidateResponse> {
    let removed = state.cache().clear();
    Json(InvalidateResponse::new("*", removed))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
