//! Route table.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the application router over shared state.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/webhook/tradingview", post(handlers::webhook))
        .route("/auth/login", get(handlers::auth_login))
        .route("/auth/callback", get(handlers::auth_callback))
        .route("/api/search", get(handlers::search))
        .route("/api/verify-pin", post(handlers::verify_pin))
        .route("/api/change-pin", post(handlers::change_pin))
        .route("/health", get(handlers::health))
        .with_state(state)
}
