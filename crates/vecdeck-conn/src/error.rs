//! Connection error types.

use thiserror::Error;

/// Result type alias for connection operations.
pub type ConnResult<T> = Result<T, ConnError>;

/// Errors that can occur during connection management.
#[derive(Debug, Error)]
pub enum ConnError {
    /// Address unreachable, auth rejected, or the health probe reported
    /// unhealthy. Surfaced at the connect boundary, never retried
    /// automatically.
    #[error("connect failed: {0}")]
    ConnectFailed(String),

    /// An operation requiring an active client was invoked with none
    /// present — expired, evicted, or never connected. Callers
    /// re-connect; nothing auto-reconnects.
    #[error("no active connection")]
    NotConnected,
}
