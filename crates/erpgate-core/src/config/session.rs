//! Session management configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Session management configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Sliding idle timeout in seconds. A session not used for this long
    /// is treated as gone on the next lookup.
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_seconds: u64,
    /// Interval between sweeps that drop expired sessions, in seconds.
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_seconds: u64,
    /// Session cookie attributes.
    #[serde(default)]
    pub cookie: CookieConfig,
}

impl SessionConfig {
    /// Idle timeout as a [`Duration`].
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_seconds)
    }

    /// Cleanup interval as a [`Duration`].
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_seconds)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_seconds: default_idle_timeout(),
            cleanup_interval_seconds: default_cleanup_interval(),
            cookie: CookieConfig::default(),
        }
    }
}

/// Attributes of the cookie carrying the session identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CookieConfig {
    /// Cookie name.
    #[serde(default = "default_cookie_name")]
    pub name: String,
    /// Whether the `Secure` attribute is set. Only disable for plain-HTTP
    /// local development.
    #[serde(default = "default_true")]
    pub secure: bool,
    /// `SameSite` attribute.
    #[serde(default)]
    pub same_site: CookieSameSite,
    /// Cookie path.
    #[serde(default = "default_cookie_path")]
    pub path: String,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: default_cookie_name(),
            secure: true,
            same_site: CookieSameSite::default(),
            path: default_cookie_path(),
        }
    }
}

/// `SameSite` policy for the session cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CookieSameSite {
    /// Sent only on same-site requests.
    #[default]
    Strict,
    /// Sent on same-site requests and top-level navigations.
    Lax,
    /// Always sent; requires `Secure`.
    None,
}

impl std::fmt::Display for CookieSameSite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CookieSameSite::Strict => write!(f, "strict"),
            CookieSameSite::Lax => write!(f, "lax"),
            CookieSameSite::None => write!(f, "none"),
        }
    }
}

fn default_idle_timeout() -> u64 {
    30 * 60
}

fn default_cleanup_interval() -> u64 {
    60
}

fn default_cookie_name() -> String {
    "erpgate_session".to_string()
}

fn default_cookie_path() -> String {
    "/".to_string()
}

fn default_true() -> bool {
    true
}
