//! Client adapter error types.

use thiserror::Error;

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur while talking to the vector database.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("connect failed: {0}")]
    Connect(String),

    #[error("health probe failed: {0}")]
    Probe(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("response decode failed: {0}")]
    Decode(String),
}
