//! Login credentials as submitted by a client.

/// Transient login input. Never stored, never logged in full.
#[derive(Clone)]
pub struct Credential {
    /// ERP base URL; the configured default when absent.
    pub endpoint: Option<String>,
    /// ERP database name; the configured default when absent.
    pub database: Option<String>,
    pub username: String,
    pub password: String,
}

impl Credential {
    /// Credentials targeting the configured default endpoint and database.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            endpoint: None,
            database: None,
            username: username.into(),
            password: password.into(),
        }
    }

    /// Overrides the ERP endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Overrides the ERP database.
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("endpoint", &self.endpoint)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
