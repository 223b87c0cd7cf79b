//! Model Error Types

use thiserror::Error;

/// Errors while decoding objective model values
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// Duration string not in protobuf JSON form (e.g. "300s")
    #[error("Invalid duration: {0}")]
    InvalidDuration(String),

    /// Label selector that is not a plain equality matcher list
    #[error("Invalid label selector: {0}")]
    InvalidSelector(String),

    /// Alert state name or number outside the known states
    #[error("Unknown alert state: {0}")]
    UnknownState(String),
}
