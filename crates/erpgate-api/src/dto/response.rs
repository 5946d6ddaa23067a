//! Response DTOs.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use erpgate_auth::Identity;

/// Login response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Gateway session identifier, also set as a cookie.
    pub session_id: String,
    pub username: String,
}

/// Who-am-i response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhoAmIResponse {
    pub username: String,
    pub database: String,
    pub endpoint: String,
}

impl From<Identity> for WhoAmIResponse {
    fn from(identity: Identity) -> Self {
        Self {
            username: identity.username,
            database: identity.database,
            endpoint: identity.endpoint,
        }
    }
}

/// Result of a forwarded model call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallResponse {
    pub result: Value,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Status.
    pub status: String,
    /// Version.
    pub version: String,
    /// Uptime in seconds.
    pub uptime_seconds: u64,
    /// Sessions currently held, including idle ones not yet purged.
    pub active_sessions: usize,
}
