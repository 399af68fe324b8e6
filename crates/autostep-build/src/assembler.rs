//! Builds the in-memory [`Project`] for a command.
//!
//! Assembly order:
//! 1. An empty project with options taken from configuration
//! 2. Every loaded entry point attaches, in load order
//! 3. Content installed by extensions is added to both file slots
//! 4. Project-local files matching the configured globs are added, with
//!    the `.autostep` state directory always excluded

use std::path::Path;
use std::sync::Arc;

use autostep_config::{ProjectConfig, ResolvedConfiguration};
use autostep_core::{
    Diagnostic, Diagnostics, FileSet, INTERACTION_FILE_EXTENSION, Project, ProjectCompiler,
    ProjectOptions, TEST_FILE_EXTENSION,
};
use autostep_extensions::{CONTENT_DIR, ExtensionHandle, STATE_DIR};
use tracing::{debug, info, instrument};

use crate::errors::Result;

/// Configuration key enabling compiler diagnostic mode.
pub const DIAGNOSTIC_KEY: &str = "diagnostic";

/// Assemble the project rooted at `project_dir`.
///
/// A project with no test files at all gets a warning in `diagnostics`.
#[instrument(skip_all, fields(project = %project_dir.display()))]
pub fn assemble_project(
    project_dir: &Path,
    config: &ResolvedConfiguration,
    extensions: &ExtensionHandle,
    diagnostics: &mut Diagnostics,
    compiler: Arc<dyn ProjectCompiler>,
) -> Result<Project> {
    let options = ProjectOptions {
        diagnostic: config.get_bool(DIAGNOSTIC_KEY).unwrap_or(false),
    };
    let mut project = Project::new(project_dir, options, compiler);

    for entry_point in extensions.entry_points() {
        debug!(extension = entry_point.name(), "attaching extension to project");
        entry_point.attach_to_project(config, &mut project)?;
    }

    let content_glob = |extension: &str| format!("*/{CONTENT_DIR}/**/*.{extension}");
    let no_exclusions: [&str; 0] = [];
    let root = extensions.extensions_root();
    project.add_interaction_files(&FileSet::create(
        root,
        [content_glob(INTERACTION_FILE_EXTENSION)],
        no_exclusions,
    )?);
    project.add_test_files(&FileSet::create(
        root,
        [content_glob(TEST_FILE_EXTENSION)],
        no_exclusions,
    )?);

    let project_config = ProjectConfig::from_resolved(config)?;
    let state_exclusion = [format!("{STATE_DIR}/**")];
    project.add_interaction_files(&FileSet::create(
        project_dir,
        &project_config.interaction_files,
        &state_exclusion,
    )?);
    project.add_test_files(&FileSet::create(
        project_dir,
        &project_config.test_files,
        &state_exclusion,
    )?);

    if project.test_files().is_empty() {
        diagnostics.push(Diagnostic::warning(format!(
            "no test files found in {}",
            project_dir.display()
        )));
    }

    info!(
        interaction_files = project.interaction_files().len(),
        test_files = project.test_files().len(),
        steps = project.step_definitions().len(),
        "project assembled"
    );
    Ok(project)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
