//! Polling error types.
//!
//! The display strings are the stable, UI-visible messages — handlers
//! forward them verbatim.

use thiserror::Error;

/// Result type alias for polling operations.
pub type PollResult<T> = Result<T, PollError>;

/// Errors for invalid toggle requests.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PollError {
    /// The requested job name is not one the poller knows.
    #[error("Unsupported event type")]
    UnsupportedJob,

    /// Stop was requested for a scope that never registered a job.
    /// Start deliberately has no such case — it self-creates.
    #[error("No existed job entity")]
    JobNotFound,
}
