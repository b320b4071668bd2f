//! Propagation error types.

use thiserror::Error;
use uuid::Uuid;

/// Outcome of one remote push attempt, classified by the adapter.
///
/// The classification decides the retry policy: transient failures burn an
/// attempt and back off; permanent failures dead-letter immediately.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PushError {
    /// Network error, 5xx, rate limit: worth retrying.
    #[error("transient push failure: {0}")]
    Transient(String),

    /// The remote rejected the request as malformed: retrying cannot help.
    #[error("permanent push failure: {0}")]
    Permanent(String),
}

/// Errors surfaced by the dispatcher's own API.
#[derive(Debug, Error)]
pub enum PropagationError {
    /// The queue is at capacity. Retryable by the caller.
    #[error("propagation queue full (capacity {capacity})")]
    QueueFull { capacity: usize },

    /// The dispatcher has shut down and accepts no new tasks.
    #[error("propagation dispatcher is shut down")]
    Closed,

    /// The dead-letter or mapping store failed.
    #[error("storage failure: {0}")]
    Storage(String),

    /// No dead letter exists under the given id.
    #[error("unknown dead letter: {0}")]
    UnknownFailure(Uuid),
}
