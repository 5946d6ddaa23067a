//! The seam between the auth gateway and the remote ERP.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ErpError;
use crate::session::ErpSession;

/// Remote ERP operations the gateway depends on.
///
/// Implementations classify every failure into [`ErpError`] and never
/// retry on their own; whether to re-authenticate is the caller's call.
#[async_trait]
pub trait ErpConnector: Send + Sync + std::fmt::Debug {
    /// Performs the authentication handshake and returns a fresh session.
    async fn authenticate(
        &self,
        endpoint: &str,
        database: &str,
        username: &str,
        password: &str,
    ) -> Result<ErpSession, ErpError>;

    /// Forwards `model.method(*args, **kwargs)` using the session's token.
    ///
    /// Returns [`ErpError::SessionExpired`] when the remote side no longer
    /// recognizes the token.
    async fn call(
        &self,
        session: &ErpSession,
        model: &str,
        method: &str,
        args: Value,
        kwargs: Value,
    ) -> Result<Value, ErpError>;

    /// Ends the remote session.
    async fn logout(&self, session: &ErpSession) -> Result<(), ErpError>;
}
