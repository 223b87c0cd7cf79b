//! Objective Service Error Types

use thiserror::Error;

/// Errors talking to the objective service
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ServiceError {
    /// Connection or transport failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// The service answered with an error status
    #[error("Service returned {code}: {message}")]
    Status { code: String, message: String },

    /// Response body could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// No response within the configured timeout
    #[error("Request timed out after {0}ms")]
    Timeout(u64),

    /// Base URL could not be joined with the method path
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ServiceError::Decode(err.to_string())
        } else {
            ServiceError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        ServiceError::Decode(err.to_string())
    }
}
