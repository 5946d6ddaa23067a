//! Convenience result type alias for erpgate.

use crate::error::AppError;

/// A specialized `Result` type for erpgate operations.
pub type AppResult<T> = Result<T, AppError>;
