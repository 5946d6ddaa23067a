//! Request DTOs with validation.

use serde::Deserialize;
use serde_json::Value;
use validator::Validate;

use erpgate_auth::Credential;

/// Login request body.
///
/// Username content is judged by the allow-list, not here; only sizes
/// are bounded so oversized bodies are rejected early.
#[derive(Clone, Deserialize, Validate)]
pub struct LoginRequest {
    /// ERP base URL. Defaults to the configured endpoint.
    #[serde(default)]
    #[validate(length(max = 2048))]
    pub endpoint: Option<String>,
    /// ERP database. Defaults to the configured database.
    #[serde(default)]
    #[validate(length(max = 255))]
    pub database: Option<String>,
    #[validate(length(max = 512))]
    pub username: String,
    #[validate(length(max = 1024, message = "Password is too long"))]
    pub password: String,
}

impl From<LoginRequest> for Credential {
    fn from(req: LoginRequest) -> Self {
        Credential {
            endpoint: req.endpoint,
            database: req.database,
            username: req.username,
            password: req.password,
        }
    }
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("endpoint", &self.endpoint)
            .field("database", &self.database)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// Forwarded model call.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CallRequest {
    /// Model name, e.g. `res.partner`.
    #[validate(length(min = 1, max = 128, message = "Model is required"))]
    pub model: String,
    /// Method name, e.g. `search_read`.
    #[validate(length(min = 1, max = 128, message = "Method is required"))]
    pub method: String,
    /// Positional arguments.
    #[serde(default = "empty_args")]
    pub args: Value,
    /// Keyword arguments.
    #[serde(default = "empty_kwargs")]
    pub kwargs: Value,
}

fn empty_args() -> Value {
    Value::Array(Vec::new())
}

fn empty_kwargs() -> Value {
    Value::Object(serde_json::Map::new())
}
