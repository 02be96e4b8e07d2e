//! Axum router configuration with middleware.
//!
//! - `POST /webhook`: Telegram updates.
//! - `GET /test`, `GET /health`: liveness.
//! - `/api/v1/...`: JSON API over the conversation engine.
//!
//! Middleware: CORS, request tracing.

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Plain-text reply of `GET /test`.
pub const LIVENESS_TEXT: &str = "ok from chatline";

/// Build the complete router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/chat", post(handlers::chat::chat))
        .route("/history/{user_id}", get(handlers::history::get_history))
        .route(
            "/history/{user_id}/reset",
            post(handlers::history::reset_history),
        );

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/webhook", post(handlers::webhook::telegram_webhook))
        .route("/test", get(liveness))
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /test - Liveness string.
async fn liveness() -> &'static str {
    LIVENESS_TEXT
}

/// GET /health - Health check with version.
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
