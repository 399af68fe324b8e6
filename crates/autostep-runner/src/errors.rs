//! Runner error types.

use thiserror::Error;

/// Errors that stop a test run.
///
/// A failing step is not an error; it is recorded in the
/// [`RunSummary`](crate::summary::RunSummary).
#[derive(Debug, Error)]
pub enum RunError {
    /// The run was cancelled before it finished.
    #[error("test run cancelled after {completed} scenario(s)")]
    Cancelled {
        /// Scenarios that finished before cancellation.
        completed: usize,
    },
}

/// Result type for runner operations.
pub type Result<T> = std::result::Result<T, RunError>;
