//! Odoo JSON-RPC 2.0 envelopes and remote error classification.
//!
//! Odoo answers every RPC with HTTP 200; failures travel in the `error`
//! member of the body.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ErpError;

/// Path of the authentication method.
pub const AUTHENTICATE_PATH: &str = "/web/session/authenticate";

/// Path of the session teardown method.
pub const DESTROY_PATH: &str = "/web/session/destroy";

/// Prefix of the model method dispatcher; `/{model}/{method}` follows.
pub const CALL_KW_PATH: &str = "/web/dataset/call_kw";

/// Name of the cookie carrying the remote session token.
pub const SESSION_COOKIE: &str = "session_id";

/// Remote error code Odoo uses for an expired or unknown session.
const SESSION_EXPIRED_CODE: i64 = 100;

const SESSION_EXPIRED_EXCEPTION: &str = "odoo.http.SessionExpiredException";

const ACCESS_DENIED_EXCEPTION: &str = "odoo.exceptions.AccessDenied";

/// Outgoing JSON-RPC request.
#[derive(Debug, Serialize)]
pub struct RpcRequest<P: Serialize> {
    /// Always `"2.0"`.
    pub jsonrpc: &'static str,
    /// Always `"call"` for Odoo web routes.
    pub method: &'static str,
    /// Correlation id.
    pub id: u64,
    /// Method parameters.
    pub params: P,
}

impl<P: Serialize> RpcRequest<P> {
    /// Wraps `params` in a `call` envelope.
    pub fn call(id: u64, params: P) -> Self {
        Self {
            jsonrpc: "2.0",
            method: "call",
            id,
            params,
        }
    }
}

/// Parameters of `/web/session/authenticate`.
#[derive(Serialize)]
pub struct AuthenticateParams<'a> {
    pub db: &'a str,
    pub login: &'a str,
    pub password: &'a str,
}

/// Parameters of `/web/dataset/call_kw`.
#[derive(Debug, Serialize)]
pub struct CallKwParams<'a> {
    pub model: &'a str,
    pub method: &'a str,
    pub args: Value,
    pub kwargs: Value,
}

/// Incoming JSON-RPC response.
#[derive(Debug, Deserialize)]
pub struct RpcResponse {
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<RpcError>,
}

/// The `error` member of a JSON-RPC response.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcError {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: Option<RpcErrorData>,
}

/// Odoo's exception details inside an [`RpcError`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RpcErrorData {
    /// Fully qualified exception class, e.g. `odoo.exceptions.AccessDenied`.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub message: String,
}

impl RpcError {
    fn exception_name(&self) -> &str {
        self.data.as_ref().map(|d| d.name.as_str()).unwrap_or_default()
    }

    fn is_session_expired(&self) -> bool {
        self.code == SESSION_EXPIRED_CODE || self.exception_name() == SESSION_EXPIRED_EXCEPTION
    }

    /// Classification during the authentication handshake.
    ///
    /// A login ends as invalid credentials or as a protocol failure. The
    /// remote text is kept in the `Protocol` detail, which only ever reaches
    /// the logs.
    pub fn into_auth_error(self) -> ErpError {
        if self.exception_name() == ACCESS_DENIED_EXCEPTION {
            return ErpError::InvalidCredentials;
        }
        let message = match self.data {
            Some(data) if !data.message.is_empty() => data.message,
            _ => self.message,
        };
        ErpError::Protocol(format!(
            "Authentication failed with remote error {}: {}",
            self.code,
            ErpError::truncate_body(&message)
        ))
    }

    /// Classification for a forwarded call. `AccessDenied` here is a
    /// permission problem on a record, not a bad password.
    pub fn into_call_error(self) -> ErpError {
        if self.is_session_expired() {
            return ErpError::SessionExpired;
        }

        let (name, message) = match self.data {
            Some(data) if !data.name.is_empty() => {
                let message = if data.message.is_empty() {
                    self.message
                } else {
                    data.message
                };
                (data.name, message)
            }
            _ => (format!("rpc.{}", self.code), self.message),
        };

        ErpError::Remote {
            name,
            message: ErpError::truncate_body(&message),
        }
    }
}

/// The parts of an authenticate `result` erpgate relies on.
#[derive(Debug, Deserialize)]
pub struct AuthenticateResult {
    /// Remote user id, or `false` when credentials were rejected.
    #[serde(default)]
    pub uid: Value,
    /// Present in the body on older Odoo versions only.
    #[serde(default)]
    pub session_id: Option<String>,
}

impl AuthenticateResult {
    /// The authenticated user id.
    pub fn user_id(&self) -> Result<i64, ErpError> {
        match &self.uid {
            Value::Number(n) => n
                .as_i64()
                .ok_or_else(|| ErpError::Protocol(format!("uid is not an integer: {n}"))),
            Value::Bool(false) | Value::Null => Err(ErpError::InvalidCredentials),
            other => Err(ErpError::Protocol(format!("Unexpected uid value: {other}"))),
        }
    }
}

/// Extract the `session_id` value from one `Set-Cookie` header value.
pub fn session_cookie_value(set_cookie: &str) -> Option<&str> {
    let pair = set_cookie.split(';').next()?;
    let (name, value) = pair.split_once('=')?;
    if name.trim() != SESSION_COOKIE {
        return None;
    }
    let value = value.trim().trim_matches('"');
    if value.is_empty() { None } else { Some(value) }
}

/// Whether `segment` is safe to place in a call_kw URL path.
pub fn is_valid_path_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment.len() <= 128
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}
