//! Router assembly: game API, static files (word list + cached artwork), CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;

/// Build the application router with:
/// - JSON game API under `/api/v1/...`
/// - Static files from the configured static dir under `/static` (artwork cache lives there)
/// - CORS (allow any origin/method/headers); adjust for production if needed
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    let static_service = ServeDir::new(state.config.static_dir.clone());

    Router::new()
        .route("/api/v1/health", get(http::http_health))
        .route("/api/v1/game", get(http::http_get_game))
        .route("/api/v1/round", post(http::http_post_round))
        .route("/api/v1/guess", post(http::http_post_guess))
        .route("/api/v1/difficulty", post(http::http_post_difficulty))
        .route("/api/v1/restart", post(http::http_post_restart))
        .route("/api/v1/reset", post(http::http_post_reset))
        .nest_service("/static", static_service)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                        .on_request(DefaultOnRequest::new().level(Level::INFO))
                        .on_response(DefaultOnResponse::new().level(Level::INFO)),
                )
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
}
