//! # erpgate-api
//!
//! HTTP API layer for erpgate built on Axum.
//!
//! Provides the login, logout, who-am-i, call and health endpoints,
//! the session cookie extractor, CORS and request logging middleware,
//! DTOs, and the mapping from `AppError` to HTTP responses.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::build_app;
pub use error::ApiError;
pub use state::AppState;
