//! Allow-list of users permitted to log in.
//!
//! Usernames are compared case-insensitively after trimming. The list is
//! loaded once from configuration and never mutated afterwards, so the
//! validator can be shared freely between request tasks.

use std::collections::HashSet;
use std::sync::Arc;

use erpgate_core::config::AccessConfig;

/// Longest username accepted (the practical limit of an e-mail address).
const MAX_USERNAME_LENGTH: usize = 254;

/// Canonical form used for comparison, or `None` if the input can never
/// be an allowed username.
///
/// Control characters are refused anywhere in the input, including the
/// ends; surrounding spaces are trimmed.
fn canonical_username(raw: &str) -> Option<String> {
    if raw.chars().any(char::is_control) {
        return None;
    }
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.len() > MAX_USERNAME_LENGTH {
        return None;
    }
    if trimmed.chars().any(char::is_whitespace) {
        return None;
    }
    Some(trimmed.to_lowercase())
}

/// An immutable set of permitted usernames.
#[derive(Debug, Clone, Default)]
pub struct AllowList {
    users: HashSet<String>,
}

impl AllowList {
    /// Builds an allow-list, dropping entries that could never match.
    pub fn new<I, S>(users: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let users = users
            .into_iter()
            .filter_map(|u| canonical_username(u.as_ref()))
            .collect();
        Self { users }
    }

    /// Builds the allow-list from `[access]` configuration.
    pub fn from_config(config: &AccessConfig) -> Self {
        Self::new(&config.allowed_users)
    }

    /// Whether `username` is on the list.
    pub fn contains(&self, username: &str) -> bool {
        canonical_username(username).is_some_and(|u| self.users.contains(&u))
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

/// Decides whether a login attempt may proceed to the ERP.
///
/// A pure membership check with no I/O, so it is safe to run before any
/// remote work is attempted.
#[derive(Debug, Clone)]
pub struct CredentialValidator {
    allow_list: Arc<AllowList>,
}

impl CredentialValidator {
    pub fn new(allow_list: Arc<AllowList>) -> Self {
        Self { allow_list }
    }

    /// Returns `true` only for non-empty usernames on the allow-list.
    pub fn validate(&self, username: &str) -> bool {
        self.allow_list.contains(username)
    }

    pub fn allow_list(&self) -> &AllowList {
        &self.allow_list
    }
}
