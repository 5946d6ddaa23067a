//! The remote session obtained from a successful Odoo handshake.

use chrono::{DateTime, Utc};

/// An authenticated ERP session.
///
/// Owned by the session store; clients only ever see the store's
/// identifier, never the remote token.
#[derive(Clone, PartialEq, Eq)]
pub struct ErpSession {
    /// Remote session token (the Odoo `session_id` cookie value).
    pub token: String,
    /// Endpoint the session was opened against, normalized.
    pub endpoint: String,
    /// Database the session was opened against.
    pub database: String,
    /// The login the user authenticated with.
    pub username: String,
    /// Remote user id (`res.users` id).
    pub uid: i64,
    /// When the handshake completed.
    pub created_at: DateTime<Utc>,
    /// Last time a call was forwarded with this session.
    pub last_used: DateTime<Utc>,
}

impl ErpSession {
    /// Creates a session stamped with the current time.
    pub fn new(
        token: impl Into<String>,
        endpoint: impl Into<String>,
        database: impl Into<String>,
        username: impl Into<String>,
        uid: i64,
    ) -> Self {
        let now = Utc::now();
        Self {
            token: token.into(),
            endpoint: endpoint.into(),
            database: database.into(),
            username: username.into(),
            uid,
            created_at: now,
            last_used: now,
        }
    }
}

impl std::fmt::Debug for ErpSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErpSession")
            .field("token", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("uid", &self.uid)
            .field("created_at", &self.created_at)
            .field("last_used", &self.last_used)
            .finish()
    }
}
