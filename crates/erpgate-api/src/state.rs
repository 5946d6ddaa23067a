//! Application state shared across all handlers and middleware.

use std::sync::Arc;
use std::time::Instant;

use erpgate_auth::AuthGateway;
use erpgate_core::config::AppConfig;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are cheap to clone across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Login, logout and call forwarding
    pub gateway: Arc<AuthGateway>,
    /// Process start, for uptime reporting
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: Arc<AppConfig>, gateway: Arc<AuthGateway>) -> Self {
        Self {
            config,
            gateway,
            started_at: Instant::now(),
        }
    }
}
