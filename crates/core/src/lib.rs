//! Shared primitives for all Rust crates in the view badge service.

#![forbid(unsafe_code)]

use thiserror::Error;

/// Result type used across view badge crates.
pub type AppResult<T> = Result<T, AppError>;

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Internal unexpected error, including counter store failures.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns true when the error should be hidden from API callers.
    #[must_use]
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Internal(_))
    }
}
