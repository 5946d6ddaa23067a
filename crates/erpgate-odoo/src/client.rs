//! Odoo JSON-RPC client.
//!
//! [`OdooClient`] performs the `/web/session/authenticate` handshake and
//! forwards model calls through `/web/dataset/call_kw` using the remote
//! session cookie. It holds no per-user state; every call receives the
//! endpoint and token it should use, so one client serves every tenant.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, header};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use erpgate_core::config::erp::normalize_endpoint;

use crate::connector::ErpConnector;
use crate::error::ErpError;
use crate::rpc::{
    AUTHENTICATE_PATH, AuthenticateParams, AuthenticateResult, CALL_KW_PATH, CallKwParams,
    DESTROY_PATH, RpcRequest, RpcResponse, SESSION_COOKIE, is_valid_path_segment,
    session_cookie_value,
};
use crate::session::ErpSession;

/// A raw RPC answer plus the session token the server set, if any.
struct RpcReply {
    body: RpcResponse,
    session_token: Option<String>,
}

/// Odoo client.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Debug, Clone)]
pub struct OdooClient {
    client: Client,
    request_id: Arc<AtomicU64>,
}

impl OdooClient {
    /// Create a client whose every request is bounded by `call_timeout`.
    pub fn new(call_timeout: Duration) -> Result<Self, ErpError> {
        let client = Client::builder()
            .timeout(call_timeout)
            .connect_timeout(call_timeout)
            .user_agent(concat!("erpgate/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ErpError::Transport(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            request_id: Arc::new(AtomicU64::new(1)),
        })
    }

    fn next_id(&self) -> u64 {
        self.request_id.fetch_add(1, Ordering::Relaxed)
    }

    async fn post_rpc<P: Serialize>(
        &self,
        url: &str,
        params: P,
        token: Option<&str>,
    ) -> Result<RpcReply, ErpError> {
        let request = RpcRequest::call(self.next_id(), params);

        let mut builder = self
            .client
            .post(url)
            .header(header::ACCEPT, "application/json")
            .json(&request);
        if let Some(token) = token {
            builder = builder.header(header::COOKIE, format!("{SESSION_COOKIE}={token}"));
        }

        let response = builder.send().await.map_err(ErpError::from_send)?;
        let status = response.status();

        let session_token = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find_map(session_cookie_value)
            .map(String::from);

        let bytes = response.bytes().await.map_err(ErpError::from_send)?;

        if status != reqwest::StatusCode::OK {
            return Err(ErpError::from_status(
                status,
                &String::from_utf8_lossy(&bytes),
            ));
        }

        let body: RpcResponse = serde_json::from_slice(&bytes)
            .map_err(|e| ErpError::Protocol(format!("Response is not JSON-RPC: {e}")))?;

        Ok(RpcReply {
            body,
            session_token,
        })
    }
}

#[async_trait]
impl ErpConnector for OdooClient {
    async fn authenticate(
        &self,
        endpoint: &str,
        database: &str,
        username: &str,
        password: &str,
    ) -> Result<ErpSession, ErpError> {
        let endpoint = normalize_endpoint(endpoint);
        let url = format!("{endpoint}{AUTHENTICATE_PATH}");
        debug!(endpoint = %endpoint, database = %database, "Authenticating against ERP");

        let params = AuthenticateParams {
            db: database,
            login: username,
            password,
        };
        let reply = self.post_rpc(&url, params, None).await?;

        if let Some(error) = reply.body.error {
            return Err(error.into_auth_error());
        }

        let result = reply
            .body
            .result
            .ok_or_else(|| ErpError::Protocol("Response has neither result nor error".into()))?;

        let result: AuthenticateResult = serde_json::from_value(result)
            .map_err(|e| ErpError::Protocol(format!("Unexpected authenticate result: {e}")))?;

        let uid = result.user_id()?;

        let token = reply
            .session_token
            .or(result.session_id)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ErpError::Protocol("No session token in authenticate response".into()))?;

        Ok(ErpSession::new(token, endpoint, database, username, uid))
    }

    async fn call(
        &self,
        session: &ErpSession,
        model: &str,
        method: &str,
        args: Value,
        kwargs: Value,
    ) -> Result<Value, ErpError> {
        if !is_valid_path_segment(model) || !is_valid_path_segment(method) {
            return Err(ErpError::InvalidRequest(
                "Model and method may only contain letters, digits, '_' and '.'".into(),
            ));
        }
        if !args.is_array() {
            return Err(ErpError::InvalidRequest("args must be a JSON array".into()));
        }
        if !kwargs.is_object() {
            return Err(ErpError::InvalidRequest("kwargs must be a JSON object".into()));
        }

        let url = format!("{}{CALL_KW_PATH}/{model}/{method}", session.endpoint);
        debug!(model = %model, method = %method, uid = session.uid, "Forwarding ERP call");

        let params = CallKwParams {
            model,
            method,
            args,
            kwargs,
        };
        let reply = self.post_rpc(&url, params, Some(&session.token)).await?;

        if let Some(error) = reply.body.error {
            return Err(error.into_call_error());
        }

        // Odoo methods returning None serialize as `"result": null`.
        Ok(reply.body.result.unwrap_or(Value::Null))
    }

    async fn logout(&self, session: &ErpSession) -> Result<(), ErpError> {
        let url = format!("{}{DESTROY_PATH}", session.endpoint);
        let reply = self
            .post_rpc(&url, serde_json::json!({}), Some(&session.token))
            .await?;

        match reply.body.error {
            Some(error) => match error.into_call_error() {
                // Already gone on the remote side.
                ErpError::SessionExpired => Ok(()),
                other => {
                    warn!(error = %other, "ERP session destroy failed");
                    Err(other)
                }
            },
            None => Ok(()),
        }
    }
}
