//! Alerting Error Types

use thiserror::Error;

/// Errors building dashboard inputs
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AlertingError {
    /// Time range whose end is not after its start
    #[error("Invalid time range: {from_ms}..{to_ms}")]
    InvalidRange { from_ms: i64, to_ms: i64 },

    /// Millisecond timestamp outside what can be represented
    #[error("Timestamp out of range: {0}")]
    OutOfRange(i64),

    /// Prometheus base URL that cannot be parsed or joined
    #[error("Invalid Prometheus URL: {0}")]
    InvalidUrl(String),
}
