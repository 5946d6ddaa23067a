//! Route definitions for the erpgate HTTP API.
//!
//! All routes are mounted under `/api`. The router receives `AppState`
//! and passes it to all handlers via Axum's `State` extractor.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

use crate::handlers;
use crate::state::AppState;

/// Largest accepted request body. Call arguments are the only sizable input.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Build the Axum router with all routes, without the outer middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(auth_routes())
        .merge(erp_routes())
        .merge(health_routes());

    Router::new()
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}

/// Auth endpoints: login, logout, whoami
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(handlers::auth::login))
        .route("/logout", post(handlers::auth::logout))
        .route("/whoami", get(handlers::auth::whoami))
}

/// Forwarded ERP calls
fn erp_routes() -> Router<AppState> {
    Router::new().route("/call", post(handlers::erp::call))
}

fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
