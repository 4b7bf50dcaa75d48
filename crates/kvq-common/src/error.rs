//! Error types for KVQ

use thiserror::Error;

/// Authentication failures
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    /// No `Authorization: Bearer` header on the request
    #[error("missing bearer token")]
    MissingToken,

    /// Token is malformed or not registered
    #[error("invalid token")]
    InvalidToken,
}

/// KVQ error type
#[derive(Error, Debug)]
pub enum KvqError {
    /// Authentication failed
    #[error("authentication failed: {0}")]
    Auth(#[from] AuthError),

    /// Request is malformed
    #[error("validation failed: {0}")]
    Validation(String),

    /// Unexpected engine or storage failure
    #[error("internal error: {0}")]
    Internal(String),
}

impl KvqError {
    /// Shorthand for a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Shorthand for an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

impl From<std::io::Error> for KvqError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal(format!("io error: {err}"))
    }
}

/// Result type for KVQ
pub type KvqResult<T> = Result<T, KvqError>;
