use thiserror::Error;

use erpgate_core::error::{AppError, ErrorKind};

/// Failures of the ERP session client, classified before they leave this crate.
#[derive(Error, Debug)]
pub enum ErpError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Remote session expired")]
    SessionExpired,

    #[error("Remote error {name}: {message}")]
    Remote { name: String, message: String },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Maximum length for remote text carried in error messages
const MAX_ERROR_BODY_LENGTH: usize = 300;

impl ErpError {
    /// Truncate remote text to avoid logging excessive data
    pub(crate) fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }

    /// Classify a failed send. Anything that kept us from getting an answer
    /// is transport; a request we could not even build is protocol.
    pub(crate) fn from_send(err: reqwest::Error) -> Self {
        if err.is_builder() {
            ErpError::Protocol(format!("Could not build request: {err}"))
        } else if err.is_timeout() {
            ErpError::Transport("Remote call timed out".to_string())
        } else {
            ErpError::Transport(err.to_string())
        }
    }

    /// Classify a non-200 HTTP status. Gateway statuses mean the ERP was
    /// unreachable behind a proxy.
    pub(crate) fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            502..=504 => ErpError::Transport(format!("Status {status}: {truncated}")),
            _ => ErpError::Protocol(format!("Status {status}: {truncated}")),
        }
    }
}

impl From<ErpError> for AppError {
    fn from(err: ErpError) -> Self {
        match err {
            ErpError::Transport(_) => AppError::with_source(
                ErrorKind::Transport,
                "The ERP server could not be reached, try again later",
                err,
            ),
            ErpError::InvalidCredentials => {
                AppError::invalid_credentials("Invalid username or password")
            }
            ErpError::Protocol(_) => AppError::with_source(
                ErrorKind::Protocol,
                "Unexpected response from the ERP server, try again later",
                err,
            ),
            ErpError::SessionExpired => {
                AppError::session_expired("The ERP session has expired, please log in again")
            }
            ErpError::Remote { message, .. } => AppError::remote(message),
            ErpError::InvalidRequest(message) => AppError::validation(message),
        }
    }
}
