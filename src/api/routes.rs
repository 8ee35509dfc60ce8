//! API Routes
//!
//! Configures the Axum router with all service endpoints.

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    arenas_handler, challenges_handler, clear_domain_handler, clear_handler, health_handler,
    invalidate_key_handler, invalidate_pattern_handler, leaderboard_handler, quests_handler,
    stats_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /arenas`, `GET /challenges`, `GET /quests` - Cached collections
/// - `GET /leaderboard/:category?period=` - Cached leaderboard
/// - `GET /cache/stats?top=N` - Cache statistics
/// - `DELETE /cache/keys/:key` - Invalidate one key
/// - `DELETE /cache/domains/:name` - Clear one domain
/// - `POST /cache/invalidate` - Invalidate keys matching a pattern
/// - `DELETE /cache` - Clear the whole cache
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/arenas", get(arenas_handler))
        .route("/challenges", get(challenges_handler))
        .route("/quests", get(quests_handler))
        .route("/leaderboard/:category", get(leaderboard_handler))
        .route("/cache", delete(clear_handler))
        .route("/cache/stats", get(stats_handler))
        .route("/cache/keys/:key", delete(invalidate_key_handler))
        .route("/cache/domains/:name", delete(clear_domain_handler))
        .route("/cache/invalidate", post(invalidate_pattern_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
