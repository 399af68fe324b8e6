//! Configuration error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while resolving or reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read or is not valid JSON.
    #[error("invalid configuration file {}: {source}", path.display())]
    File {
        /// Path of the offending file.
        path: PathBuf,
        /// Underlying provider error.
        #[source]
        source: Box<figment::Error>,
    },
    /// Environment variables could not be read as configuration.
    #[error("invalid configuration environment: {0}")]
    Environment(#[source] Box<figment::Error>),
    /// A command-line override token was malformed.
    #[error(transparent)]
    Override(#[from] OverrideError),
    /// A configuration value has the wrong shape.
    #[error("invalid configuration value for '{key}': {message}")]
    InvalidValue {
        /// Key path of the value.
        key: String,
        /// What is wrong with it.
        message: String,
    },
}

impl ConfigError {
    /// Shorthand for [`ConfigError::InvalidValue`].
    pub fn invalid(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            message: message.into(),
        }
    }
}

/// Errors produced while parsing `key=value` override tokens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OverrideError {
    /// The token has nothing before the `=`.
    #[error("invalid option '{token}': the key before '=' must not be empty")]
    EmptyKey {
        /// The raw token as supplied.
        token: String,
    },
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
