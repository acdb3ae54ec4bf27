//! Client error types

use serde_json::Value;
use shared::error::ErrorCode;
use std::collections::HashMap;
use thiserror::Error;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Structured error returned by the server
    #[error("{message}")]
    Api {
        code: ErrorCode,
        message: String,
        details: Option<HashMap<String, Value>>,
    },

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Authentication required
    #[error("Authentication required: {0}")]
    Unauthorized(String),

    /// Permission denied
    #[error("Permission denied: {0}")]
    Forbidden(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ClientError {
    /// Structured error code, if the server sent one
    pub fn error_code(&self) -> Option<ErrorCode> {
        match self {
            ClientError::Api { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Whether the failure was a request timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, ClientError::Http(e) if e.is_timeout())
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
