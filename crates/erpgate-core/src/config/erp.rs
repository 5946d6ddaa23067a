//! ERP (Odoo) connection configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Connection settings for the remote ERP.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErpConfig {
    /// Endpoint used when a login request does not name one.
    #[serde(default = "default_endpoint")]
    pub default_endpoint: String,
    /// Database used when a login request does not name one.
    #[serde(default = "default_database")]
    pub default_database: String,
    /// Timeout for every remote call, in seconds.
    #[serde(default = "default_call_timeout")]
    pub call_timeout_seconds: u64,
    /// Which client-supplied endpoints are accepted at login.
    #[serde(default)]
    pub endpoint_policy: EndpointPolicy,
    /// Endpoints accepted under [`EndpointPolicy::Listed`], in addition to
    /// the default endpoint.
    #[serde(default)]
    pub allowed_endpoints: Vec<String>,
}

impl ErpConfig {
    /// Remote call timeout as a [`Duration`].
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_seconds)
    }
}

impl Default for ErpConfig {
    fn default() -> Self {
        Self {
            default_endpoint: default_endpoint(),
            default_database: default_database(),
            call_timeout_seconds: default_call_timeout(),
            endpoint_policy: EndpointPolicy::default(),
            allowed_endpoints: Vec::new(),
        }
    }
}

/// Policy for client-chosen ERP endpoints and databases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EndpointPolicy {
    /// Only the configured default endpoint and database are accepted.
    #[default]
    DefaultOnly,
    /// The default endpoint or any of `allowed_endpoints`; any database.
    Listed,
    /// Any endpoint and database (multi-tenant deployments).
    Any,
}

impl std::fmt::Display for EndpointPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EndpointPolicy::DefaultOnly => write!(f, "default_only"),
            EndpointPolicy::Listed => write!(f, "listed"),
            EndpointPolicy::Any => write!(f, "any"),
        }
    }
}

/// Canonical form of an endpoint URL for comparison: trimmed, without
/// trailing slashes, scheme and host lower-cased.
pub fn normalize_endpoint(endpoint: &str) -> String {
    let trimmed = endpoint.trim().trim_end_matches('/');
    match trimmed.split_once("://") {
        Some((scheme, rest)) => {
            let (authority, path) = match rest.find('/') {
                Some(idx) => rest.split_at(idx),
                None => (rest, ""),
            };
            format!(
                "{}://{}{}",
                scheme.to_ascii_lowercase(),
                authority.to_ascii_lowercase(),
                path
            )
        }
        None => trimmed.to_string(),
    }
}

/// Whether `endpoint` looks like an absolute http(s) URL with a host.
pub fn is_http_endpoint(endpoint: &str) -> bool {
    let normalized = normalize_endpoint(endpoint);
    let rest = normalized
        .strip_prefix("https://")
        .or_else(|| normalized.strip_prefix("http://"));
    match rest {
        Some(rest) => {
            let host = rest.split('/').next().unwrap_or_default();
            !host.is_empty() && !host.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

fn default_endpoint() -> String {
    "http://localhost:8069".to_string()
}

fn default_database() -> String {
    "odoo".to_string()
}

fn default_call_timeout() -> u64 {
    30
}
