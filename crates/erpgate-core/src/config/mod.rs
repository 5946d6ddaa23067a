//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod app;
pub mod erp;
pub mod logging;
pub mod mail;
pub mod session;

use serde::{Deserialize, Serialize};

pub use self::app::{CorsConfig, ServerConfig};
pub use self::erp::{EndpointPolicy, ErpConfig};
pub use self::logging::LoggingConfig;
pub use self::mail::MailConfig;
pub use self::session::{CookieConfig, CookieSameSite, SessionConfig};

use crate::error::AppError;

/// Prefix of environment variables overriding file configuration,
/// e.g. `ERPGATE__ERP__DEFAULT_DATABASE`.
pub const ENV_PREFIX: &str = "ERPGATE";

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay) and
/// environment variables. It is validated once at startup and then shared
/// read-only.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Remote ERP settings.
    #[serde(default)]
    pub erp: ErpConfig,
    /// Who may use the application.
    #[serde(default)]
    pub access: AccessConfig,
    /// Session management settings.
    #[serde(default)]
    pub session: SessionConfig,
    /// Settings handed to the mail collaborator.
    #[serde(default)]
    pub mail: MailConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Access control configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AccessConfig {
    /// Usernames (email-like, compared case-insensitively) permitted to log in.
    #[serde(default)]
    pub allowed_users: Vec<String>,
}

impl AppConfig {
    /// Load configuration from TOML files in `config_dir`.
    ///
    /// Merges `default.toml` with an environment-specific overlay
    /// (`{env}.toml`) and environment variables prefixed with `ERPGATE__`.
    /// List values in the environment are comma separated.
    pub fn load(config_dir: &str, env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(&format!("{config_dir}/default")).required(false))
            .add_source(config::File::with_name(&format!("{config_dir}/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("access.allowed_users")
                    .with_list_parse_key("erp.allowed_endpoints"),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Parse and validate configuration from a TOML document.
    pub fn from_toml_str(toml: &str) -> Result<Self, AppError> {
        let config: Self = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Check every recognized option once. Called by the loaders.
    pub fn validate(&self) -> Result<(), AppError> {
        if !erp::is_http_endpoint(&self.erp.default_endpoint) {
            return Err(AppError::configuration(format!(
                "erp.default_endpoint must be an http(s) URL, got '{}'",
                self.erp.default_endpoint
            )));
        }

        if self.erp.default_database.trim().is_empty() {
            return Err(AppError::configuration(
                "erp.default_database must not be empty",
            ));
        }

        if let Some(bad) = self
            .erp
            .allowed_endpoints
            .iter()
            .find(|e| !erp::is_http_endpoint(e))
        {
            return Err(AppError::configuration(format!(
                "erp.allowed_endpoints contains a non-http(s) URL: '{bad}'"
            )));
        }

        if self.erp.call_timeout_seconds == 0 {
            return Err(AppError::configuration(
                "erp.call_timeout_seconds must be greater than zero",
            ));
        }

        if self.server.request_timeout_seconds <= self.erp.call_timeout_seconds {
            return Err(AppError::configuration(
                "server.request_timeout_seconds must exceed erp.call_timeout_seconds",
            ));
        }

        if self.session.idle_timeout_seconds == 0 {
            return Err(AppError::configuration(
                "session.idle_timeout_seconds must be greater than zero",
            ));
        }

        if self.session.cleanup_interval_seconds == 0 {
            return Err(AppError::configuration(
                "session.cleanup_interval_seconds must be greater than zero",
            ));
        }

        if self.session.cookie.name.trim().is_empty() {
            return Err(AppError::configuration(
                "session.cookie.name must not be empty",
            ));
        }

        if self.session.cookie.same_site == CookieSameSite::None && !self.session.cookie.secure {
            return Err(AppError::configuration(
                "session.cookie.same_site = \"none\" requires session.cookie.secure = true",
            ));
        }

        if self.access.allowed_users.iter().all(|u| u.trim().is_empty()) {
            tracing::warn!("access.allowed_users is empty; every login will be refused");
        }

        self.mail.validate()
    }
}
