//! Command errors and their classification.

use std::path::PathBuf;

use autostep_build::BuildError;
use autostep_config::ConfigError;
use autostep_extensions::ExtensionError;
use autostep_runner::RunError;
use thiserror::Error;

/// How a failed command is reported.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorClass {
    /// The user's configuration or arguments are wrong.
    Configuration,
    /// Something in the environment failed.
    Fault,
}

/// Errors that end a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The project directory does not exist.
    #[error("project directory '{}' does not exist", .0.display())]
    MissingDirectory(PathBuf),
    /// An explicitly named configuration file does not exist.
    #[error("configuration file '{}' does not exist", .0.display())]
    MissingConfigFile(PathBuf),
    /// Configuration could not be resolved.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Extensions could not be loaded or extended the run unsuccessfully.
    #[error(transparent)]
    Extension(#[from] ExtensionError),
    /// The build stopped before producing a verdict.
    #[error(transparent)]
    Build(#[from] BuildError),
    /// Execution stopped early.
    #[error(transparent)]
    Run(#[from] RunError),
    /// A project template could not be written.
    #[error("{0:#}")]
    Scaffold(anyhow::Error),
}

impl CommandError {
    /// Classify for reporting.
    pub fn class(&self) -> ErrorClass {
        let configuration = match self {
            Self::MissingDirectory(_) | Self::MissingConfigFile(_) | Self::Config(_) => true,
            Self::Extension(e) => e.is_configuration(),
            Self::Build(e) => e.is_configuration(),
            Self::Run(_) | Self::Scaffold(_) => false,
        };
        if configuration {
            ErrorClass::Configuration
        } else {
            ErrorClass::Fault
        }
    }
}
