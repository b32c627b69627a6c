//! Router configuration for the HTTP API.
//!
//! This module sets up all routes, middleware (CORS, compression, tracing),
//! and creates the axum router ready for serving.

use axum::{routing::get, Router};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
///
/// The chart endpoints keep their legacy top-level paths; the newer
/// travel-aware endpoints live under `/api`.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration - permissive for development, should be restricted in production
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health_check))
        // Legacy chart endpoints
        .route("/mean_wait_times", get(handlers::mean_wait_times))
        .route("/hourly_data", get(handlers::hourly_data))
        // Travel-aware endpoints
        .route("/api/offices", get(handlers::offices))
        .route("/api/combined-times", get(handlers::combined_times))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
