//! Error types for the token relay

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Request-level errors surfaced to clients
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RelayError {
    /// Missing or malformed client input
    #[error("{0}")]
    Validation(String),

    /// Anything unexpected while handling a request.
    /// The detail is for logs only; clients get a generic message.
    #[error("internal error: {0}")]
    Internal(String),
}

impl RelayError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal(detail.into())
    }

    /// Wire error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            RelayError::Validation(_) => ErrorCode::ValidationError,
            RelayError::Internal(_) => ErrorCode::ServerError,
        }
    }

    /// Message safe to show to clients
    pub fn public_message(&self) -> String {
        match self {
            RelayError::Validation(msg) => msg.clone(),
            RelayError::Internal(_) => SERVER_ERROR_MESSAGE.to_string(),
        }
    }
}

/// Generic message returned for server errors
pub const SERVER_ERROR_MESSAGE: &str = "Internal server error";

/// Wire error codes (the `error` field of an error body)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Missing or malformed input (HTTP 400)
    ValidationError,
    /// No route matched (HTTP 404)
    NotFound,
    /// Unexpected failure (HTTP 500)
    ServerError,
}

impl ErrorCode {
    /// HTTP status code for this error
    pub fn status(self) -> u16 {
        match self {
            ErrorCode::ValidationError => 400,
            ErrorCode::NotFound => 404,
            ErrorCode::ServerError => 500,
        }
    }
}

/// Configuration errors
#[derive(Error, Debug, Clone)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Serialization error: {0}")]
    Serialize(String),

    #[error("No configuration directory available")]
    NoConfigDir,
}
