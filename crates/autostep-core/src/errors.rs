//! Error types shared across the pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while assembling a [`FileSet`](crate::fileset::FileSet).
#[derive(Debug, Error)]
pub enum FileSetError {
    /// An include or exclude glob is not valid.
    #[error("invalid file pattern '{pattern}': {source}")]
    Pattern {
        /// The offending glob.
        pattern: String,
        /// Underlying glob error.
        #[source]
        source: globset::Error,
    },
    /// The directory walk failed.
    #[error("failed to scan {}: {source}", root.display())]
    Walk {
        /// Root of the walk.
        root: PathBuf,
        /// Underlying walk error.
        #[source]
        source: walkdir::Error,
    },
}

impl FileSetError {
    /// Whether the error stems from user configuration rather than the
    /// filesystem.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Pattern { .. })
    }
}

/// Errors in a step pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    /// The pattern has no text.
    #[error("step pattern is empty")]
    Empty,
    /// `{` and `}` do not pair up.
    #[error("unbalanced braces in step pattern '{0}'")]
    Unbalanced(String),
    /// A placeholder does not span a whole token, or has no name.
    #[error("invalid placeholder '{0}': placeholders must be a whole word like {{name}}")]
    InvalidPlaceholder(String),
}

/// Infrastructure faults raised by a project compiler.
///
/// Problems in the user's files are diagnostics, never faults.
#[derive(Debug, Error)]
pub enum CompilerFault {
    /// A project file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The operation was cancelled.
    #[error("compilation cancelled")]
    Cancelled,
    /// Link was requested before a successful compile pass.
    #[error("link requested before compile")]
    NotCompiled,
}

/// A step implementation reported failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct StepFailure {
    /// Why the step failed.
    pub message: String,
}

impl StepFailure {
    /// Create a failure with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
