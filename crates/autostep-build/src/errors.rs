//! Build pipeline errors.

use autostep_config::ConfigError;
use autostep_core::{CompilerFault, FileSetError};
use autostep_extensions::ExtensionError;
use thiserror::Error;

/// Failures that stop a build before a verdict is reached.
///
/// Problems in project files are never errors; they are reported as
/// diagnostics in the [`BuildVerdict`](crate::BuildVerdict).
#[derive(Debug, Error)]
pub enum BuildError {
    /// Configuration could not be resolved or read.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A file set could not be assembled.
    #[error(transparent)]
    FileSet(#[from] FileSetError),
    /// Extensions could not be loaded or attached.
    #[error(transparent)]
    Extension(#[from] ExtensionError),
    /// The compiler failed outside of reporting diagnostics.
    #[error("compiler fault: {0}")]
    Compiler(#[source] CompilerFault),
    /// The build was cancelled.
    #[error("build cancelled")]
    Cancelled,
}

impl BuildError {
    /// Whether the error stems from user configuration rather than the
    /// environment.
    pub fn is_configuration(&self) -> bool {
        match self {
            Self::Config(_) => true,
            Self::FileSet(e) => e.is_configuration(),
            Self::Extension(e) => e.is_configuration(),
            Self::Compiler(_) | Self::Cancelled => false,
        }
    }
}

impl From<CompilerFault> for BuildError {
    fn from(fault: CompilerFault) -> Self {
        match fault {
            CompilerFault::Cancelled => Self::Cancelled,
            other => Self::Compiler(other),
        }
    }
}

/// Result type for build operations.
pub type Result<T> = std::result::Result<T, BuildError>;
