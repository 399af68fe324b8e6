//! Command implementations.
//!
//! `build` and `run` share [`build_project`], which walks the pipeline from
//! configuration to a build verdict:
//! configuration, extensions, project assembly, compile and link.

pub mod build;
pub mod new;
pub mod run;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use autostep_build::{
    BuildVerdict, DIAGNOSTIC_KEY, assemble_project, build_and_report, report_diagnostics,
};
use autostep_config::{ConfigError, ConfigResolver, ResolvedConfiguration, parse_overrides};
use autostep_core::{Diagnostics, Project};
use autostep_extensions::{
    ExtensionHandle, ExtensionLoader, ExtensionManifest, LocalExtensionLoader, SourceSettings,
    builtin_catalog,
};
use autostep_lang::LanguageCompiler;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::args::{Cli, Command, ProjectArgs};
use crate::errors::CommandError;

/// Run the parsed command line. Returns whether the command succeeded.
pub async fn dispatch(cli: Cli, cancel: &CancellationToken) -> Result<bool, CommandError> {
    match cli.command {
        Command::Build(args) => build::execute(&args, &default_loader(), cancel).await,
        Command::Run(args) => run::execute(&args, &default_loader(), cancel).await,
        Command::New { template } => new::execute(&template),
    }
}

/// Loader backed by the built-in entry point catalog.
pub fn default_loader() -> LocalExtensionLoader {
    LocalExtensionLoader::new(Arc::new(builtin_catalog()))
}

/// Everything a successful pass through the build pipeline produced.
///
/// Fields drop in declaration order, so extensions unload last.
#[derive(Debug)]
pub struct BuiltProject {
    /// The resolved configuration.
    pub config: ResolvedConfiguration,
    /// The assembled project.
    pub project: Project,
    /// Build outcome.
    pub verdict: BuildVerdict,
    /// Loaded extensions.
    pub extensions: ExtensionHandle,
}

/// Resolve configuration, load extensions, assemble, compile and link.
pub async fn build_project(
    args: &ProjectArgs,
    loader: &dyn ExtensionLoader,
    cancel: &CancellationToken,
) -> Result<BuiltProject, CommandError> {
    let project_dir = project_directory(args.directory.as_deref())?;
    let config = resolve_configuration(&project_dir, args)?;

    let sources = SourceSettings::from_config(&project_dir, &config)?;
    let manifest = ExtensionManifest::from_config(&config)?;
    let mut diagnostics = Diagnostics::new();
    let extensions = loader.load(&sources, &manifest, &mut diagnostics, cancel).await?;
    info!(count = extensions.extensions().len(), "extensions loaded");

    let project = assemble_project(
        &project_dir,
        &config,
        &extensions,
        &mut diagnostics,
        Arc::new(LanguageCompiler::new()),
    )?;
    report_diagnostics(&diagnostics);

    let verdict = build_and_report(&project, cancel).await?;
    Ok(BuiltProject {
        config,
        project,
        verdict,
        extensions,
    })
}

fn project_directory(directory: Option<&Path>) -> Result<PathBuf, CommandError> {
    let directory = directory.unwrap_or_else(|| Path::new("."));
    let absolute = std::path::absolute(directory)
        .map_err(|_| CommandError::MissingDirectory(directory.to_path_buf()))?;
    if !absolute.is_dir() {
        return Err(CommandError::MissingDirectory(absolute));
    }
    Ok(absolute)
}

fn resolve_configuration(
    project_dir: &Path,
    args: &ProjectArgs,
) -> Result<ResolvedConfiguration, CommandError> {
    if let Some(path) = &args.config {
        if !path.is_file() {
            return Err(CommandError::MissingConfigFile(path.clone()));
        }
    }

    let (mut overrides, errors) = parse_overrides(&args.options);
    if let Some(error) = errors.into_iter().next() {
        return Err(ConfigError::from(error).into());
    }
    if args.diagnostic {
        overrides.push((DIAGNOSTIC_KEY.to_owned(), "true".to_owned()));
    }

    let config = ConfigResolver::new(project_dir)
        .config_file(args.config.clone())
        .overrides(overrides)
        .resolve()?;
    debug!(
        config = %config.config_path().display(),
        layers = config.layers().len(),
        "configuration resolved"
    );
    Ok(config)
}
