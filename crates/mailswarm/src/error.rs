//! Error types for the load runner.

use thiserror::Error;

/// Errors that stop a whole run.
///
/// Individual client failures never surface here; they are recorded in the
/// run report instead.
#[derive(Debug, Error)]
pub enum Error {
    /// Worker pool was sized to zero.
    #[error("worker pool needs at least one worker")]
    NoWorkers,

    /// Job submitted after every worker has exited.
    #[error("worker pool is no longer accepting jobs")]
    PoolClosed,

    /// A worker task panicked or was cancelled.
    #[error("worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
