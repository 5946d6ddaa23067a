//! Which ERP endpoints and databases a login may target.

use std::collections::HashSet;

use erpgate_core::config::EndpointPolicy;
use erpgate_core::config::ErpConfig;
use erpgate_core::config::erp::{is_http_endpoint, normalize_endpoint};
use erpgate_core::error::AppError;

/// Longest database name accepted from a client.
const MAX_DATABASE_LENGTH: usize = 63;

/// The endpoint and database a login resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErpTarget {
    pub endpoint: String,
    pub database: String,
}

/// Resolves client-supplied targets against the configured policy.
#[derive(Debug, Clone)]
pub struct EndpointGuard {
    default_endpoint: String,
    default_database: String,
    policy: EndpointPolicy,
    allowed: HashSet<String>,
}

impl EndpointGuard {
    pub fn from_config(config: &ErpConfig) -> Self {
        Self {
            default_endpoint: normalize_endpoint(&config.default_endpoint),
            default_database: config.default_database.clone(),
            policy: config.endpoint_policy,
            allowed: config
                .allowed_endpoints
                .iter()
                .map(|e| normalize_endpoint(e))
                .collect(),
        }
    }

    /// Fills in defaults and enforces the endpoint policy.
    ///
    /// Blank values count as absent. Returns a forbidden error for a
    /// target the policy does not permit; nothing remote is contacted.
    pub fn resolve(
        &self,
        endpoint: Option<&str>,
        database: Option<&str>,
    ) -> Result<ErpTarget, AppError> {
        let endpoint = match endpoint.map(str::trim).filter(|e| !e.is_empty()) {
            Some(raw) => {
                if !is_http_endpoint(raw) {
                    return Err(AppError::validation(
                        "ERP endpoint must be an http:// or https:// URL",
                    ));
                }
                normalize_endpoint(raw)
            }
            None => self.default_endpoint.clone(),
        };

        let database = match database.map(str::trim).filter(|d| !d.is_empty()) {
            Some(raw) => {
                if !is_valid_database_name(raw) {
                    return Err(AppError::validation(
                        "ERP database name may only contain letters, digits, '_', '-' and '.'",
                    ));
                }
                raw.to_string()
            }
            None => self.default_database.clone(),
        };

        let permitted = match self.policy {
            EndpointPolicy::DefaultOnly => {
                endpoint == self.default_endpoint && database == self.default_database
            }
            EndpointPolicy::Listed => {
                endpoint == self.default_endpoint || self.allowed.contains(&endpoint)
            }
            EndpointPolicy::Any => true,
        };

        if !permitted {
            return Err(AppError::forbidden(
                "The requested ERP endpoint is not permitted",
            ));
        }

        Ok(ErpTarget { endpoint, database })
    }
}

fn is_valid_database_name(name: &str) -> bool {
    name.len() <= MAX_DATABASE_LENGTH
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}
