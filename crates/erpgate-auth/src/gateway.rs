//! The authentication gateway.
//!
//! Sits between the HTTP handlers and the ERP client. A client session
//! moves through [`GatewayState`]: it starts anonymous, authenticates
//! against the ERP only after the allow-list accepts the username, and
//! ends either by logout or by expiry. No lock is held while the ERP is
//! being contacted.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use erpgate_core::config::ErpConfig;
use erpgate_core::error::{AppError, ErrorKind};
use erpgate_core::result::AppResult;
use erpgate_odoo::{ErpConnector, ErpError, ErpSession};

use crate::allowlist::CredentialValidator;
use crate::credential::Credential;
use crate::policy::EndpointGuard;
use crate::session::{SessionId, SessionStore};

/// Where a client session stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayState {
    Anonymous,
    Authenticating,
    Authenticated,
    LoggedOut,
    Expired,
}

impl std::fmt::Display for GatewayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GatewayState::Anonymous => write!(f, "anonymous"),
            GatewayState::Authenticating => write!(f, "authenticating"),
            GatewayState::Authenticated => write!(f, "authenticated"),
            GatewayState::LoggedOut => write!(f, "logged_out"),
            GatewayState::Expired => write!(f, "expired"),
        }
    }
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub session_id: SessionId,
    pub username: String,
}

/// The identity behind a live session.
#[derive(Debug, Clone, Serialize)]
pub struct Identity {
    pub username: String,
    pub database: String,
    pub endpoint: String,
    pub uid: i64,
    pub created_at: DateTime<Utc>,
    pub last_used: DateTime<Utc>,
}

impl From<ErpSession> for Identity {
    fn from(session: ErpSession) -> Self {
        Self {
            username: session.username,
            database: session.database,
            endpoint: session.endpoint,
            uid: session.uid,
            created_at: session.created_at,
            last_used: session.last_used,
        }
    }
}

/// Login, logout, identity lookup and call forwarding.
#[derive(Debug)]
pub struct AuthGateway {
    validator: CredentialValidator,
    endpoints: EndpointGuard,
    connector: Arc<dyn ErpConnector>,
    store: Arc<SessionStore>,
}

impl AuthGateway {
    pub fn new(
        validator: CredentialValidator,
        erp: &ErpConfig,
        connector: Arc<dyn ErpConnector>,
        store: Arc<SessionStore>,
    ) -> Self {
        Self {
            validator,
            endpoints: EndpointGuard::from_config(erp),
            connector,
            store,
        }
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Authenticates `credential` against the ERP and opens a session.
    ///
    /// The allow-list and endpoint policy are checked first; a rejected
    /// login never reaches the ERP. Credential failures carry a generic
    /// message that does not reveal which part was wrong.
    pub async fn login(&self, credential: Credential) -> AppResult<LoginOutcome> {
        let username = credential.username.trim().to_string();

        if !self.validator.validate(&username) {
            warn!(username = %username, "Login rejected: user not on allow-list");
            return Err(AppError::forbidden(
                "This user is not permitted to use the application",
            ));
        }

        if credential.password.is_empty() {
            return Err(AppError::validation("Password is required"));
        }

        let target = self.endpoints.resolve(
            credential.endpoint.as_deref(),
            credential.database.as_deref(),
        )?;

        debug!(
            username = %username,
            endpoint = %target.endpoint,
            database = %target.database,
            state = %GatewayState::Authenticating,
            "Authenticating"
        );

        let session = match self
            .connector
            .authenticate(
                &target.endpoint,
                &target.database,
                &username,
                &credential.password,
            )
            .await
        {
            Ok(session) => session,
            Err(e) => {
                warn!(
                    username = %username,
                    endpoint = %target.endpoint,
                    error = %e,
                    state = %GatewayState::Anonymous,
                    "Login failed"
                );
                return Err(e.into());
            }
        };

        let session_id = self.store.create(session);

        info!(
            username = %username,
            endpoint = %target.endpoint,
            database = %target.database,
            session = %session_id.short(),
            state = %GatewayState::Authenticated,
            "Login successful"
        );

        Ok(LoginOutcome {
            session_id,
            username,
        })
    }

    /// Ends the session. Returns whether one existed; logging out twice
    /// is harmless.
    ///
    /// The local entry is removed before anything else, then the remote
    /// session is destroyed in the background on a best-effort basis.
    pub async fn logout(&self, id: &SessionId) -> bool {
        let Some(session) = self.store.take(id).await else {
            debug!(session = %id.short(), "Logout for unknown session");
            return false;
        };

        info!(
            username = %session.username,
            session = %id.short(),
            state = %GatewayState::LoggedOut,
            "Logged out"
        );

        let connector = Arc::clone(&self.connector);
        tokio::spawn(async move {
            if let Err(e) = connector.logout(&session).await {
                debug!(error = %e, "Remote session destroy failed");
            }
        });

        true
    }

    /// The identity behind `id`. Never contacts the ERP and does not
    /// extend the idle window.
    pub async fn whoami(&self, id: &SessionId) -> AppResult<Identity> {
        self.session(id).await.map(Identity::from)
    }

    /// Forwards a model call using the session's ERP token.
    ///
    /// A successful call counts as activity. When the ERP reports the
    /// session as expired, the local entry is invalidated as well.
    pub async fn call(
        &self,
        id: &SessionId,
        model: &str,
        method: &str,
        args: Value,
        kwargs: Value,
    ) -> AppResult<Value> {
        let session = self.session(id).await?;

        match self
            .connector
            .call(&session, model, method, args, kwargs)
            .await
        {
            Ok(result) => {
                if let Err(e) = self.store.touch(id).await {
                    debug!(session = %id.short(), error = %e, "Session ended during call");
                }
                Ok(result)
            }
            Err(ErpError::SessionExpired) => {
                self.store.invalidate(id).await;
                info!(
                    username = %session.username,
                    session = %id.short(),
                    state = %GatewayState::Expired,
                    "ERP session expired"
                );
                Err(AppError::unauthorized(
                    "The ERP session has expired, please log in again",
                ))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Current state of a presented identifier.
    ///
    /// Identifiers that were logged out or expired are indistinguishable
    /// from ones never issued, so both report [`GatewayState::Anonymous`].
    pub async fn state_of(&self, id: Option<&SessionId>) -> GatewayState {
        match id {
            Some(id) if self.store.get(id).await.is_ok() => GatewayState::Authenticated,
            _ => GatewayState::Anonymous,
        }
    }

    async fn session(&self, id: &SessionId) -> AppResult<ErpSession> {
        self.store.get(id).await.map_err(|e| match e.kind {
            ErrorKind::NotFound => AppError::unauthorized("Not authenticated"),
            _ => e,
        })
    }
}
