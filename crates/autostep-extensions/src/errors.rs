//! Extension loading error types.

use std::path::PathBuf;

use autostep_config::ConfigError;
use thiserror::Error;

/// Errors that can occur while loading or running extensions.
#[derive(Debug, Error)]
pub enum ExtensionError {
    /// The extension list or sources in the configuration are invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// No configured source contains the package.
    #[error("extension package '{package}' not found; searched: {}", describe_sources(searched, feeds))]
    PackageNotFound {
        /// Requested package.
        package: String,
        /// Local directories that were searched.
        searched: Vec<PathBuf>,
        /// Remote feeds that could not be searched.
        feeds: Vec<String>,
    },

    /// The package name is not a single plain path segment.
    #[error("invalid extension package name '{package}': expected a single directory name")]
    InvalidPackageName {
        /// Name as configured.
        package: String,
    },

    /// The package's `extension.json` is missing or malformed.
    #[error("invalid extension metadata {}: {source}", path.display())]
    Metadata {
        /// Path of the metadata file.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// Only a pre-release version is available and the request does not
    /// allow it.
    #[error("extension package '{package}' version {version} is a pre-release; set \"prerelease\": true to allow it")]
    Prerelease {
        /// Requested package.
        package: String,
        /// Available version.
        version: String,
    },

    /// The package names an entry point this build does not provide.
    #[error("extension package '{package}' requires unknown entry point '{entry_point}'")]
    UnknownEntryPoint {
        /// Requested package.
        package: String,
        /// Catalog id from the package metadata.
        entry_point: String,
    },

    /// Filesystem failure while reading or installing a package.
    #[error("failed to install extension package '{package}' at {}: {source}", path.display())]
    Io {
        /// Package being installed.
        package: String,
        /// Path that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Content of a package no longer requested could not be removed.
    #[error("failed to remove stale extension content at {}: {source}", path.display())]
    Prune {
        /// Path that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// An entry point rejected the project or run.
    #[error("extension '{name}' failed: {message}")]
    EntryPoint {
        /// Entry point name.
        name: String,
        /// What went wrong.
        message: String,
    },

    /// Loading was cancelled.
    #[error("extension loading cancelled")]
    Cancelled,
}

impl ExtensionError {
    /// Whether the error stems from user configuration.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Config(_) | Self::InvalidPackageName { .. })
    }

    /// Shorthand for [`ExtensionError::EntryPoint`].
    pub fn entry_point(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::EntryPoint {
            name: name.into(),
            message: message.into(),
        }
    }
}

fn describe_sources(searched: &[PathBuf], feeds: &[String]) -> String {
    let mut parts: Vec<String> = searched.iter().map(|p| p.display().to_string()).collect();
    parts.extend(
        feeds
            .iter()
            .map(|f| format!("{f} (remote feeds are not supported by the local loader)")),
    );
    if parts.is_empty() {
        "no sources".to_owned()
    } else {
        parts.join(", ")
    }
}

/// Result type for extension operations.
pub type Result<T> = std::result::Result<T, ExtensionError>;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
