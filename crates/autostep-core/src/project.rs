//! The in-memory project model.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::compiler::ProjectCompiler;
use crate::fileset::FileSet;
use crate::steps::StepDefinition;

/// Options that change how a project is compiled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProjectOptions {
    /// Emit extra diagnostics about the compilation itself.
    pub diagnostic: bool,
}

/// A test project: its files, extension contributions and compiler.
pub struct Project {
    root: PathBuf,
    options: ProjectOptions,
    interaction_files: FileSet,
    test_files: FileSet,
    step_definitions: Vec<Arc<StepDefinition>>,
    settings: BTreeMap<String, Value>,
    compiler: Arc<dyn ProjectCompiler>,
}

impl Project {
    /// An empty project rooted at `root`.
    pub fn new(
        root: impl Into<PathBuf>,
        options: ProjectOptions,
        compiler: Arc<dyn ProjectCompiler>,
    ) -> Self {
        Self {
            root: root.into(),
            options,
            interaction_files: FileSet::new(),
            test_files: FileSet::new(),
            step_definitions: Vec::new(),
            settings: BTreeMap::new(),
            compiler,
        }
    }

    /// Project directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Compilation options.
    pub fn options(&self) -> ProjectOptions {
        self.options
    }

    /// Interaction (`.asi`) files.
    pub fn interaction_files(&self) -> &FileSet {
        &self.interaction_files
    }

    /// Test (`.as`) files.
    pub fn test_files(&self) -> &FileSet {
        &self.test_files
    }

    /// Merge more interaction files into the project.
    pub fn add_interaction_files(&mut self, files: &FileSet) {
        self.interaction_files.extend_from(files);
    }

    /// Merge more test files into the project.
    pub fn add_test_files(&mut self, files: &FileSet) {
        self.test_files.extend_from(files);
    }

    /// Register a step definition contributed outside interaction files.
    pub fn register_step(&mut self, definition: StepDefinition) {
        debug!(definition = %definition, "registering step definition");
        self.step_definitions.push(Arc::new(definition));
    }

    /// Step definitions registered by extensions.
    pub fn step_definitions(&self) -> &[Arc<StepDefinition>] {
        &self.step_definitions
    }

    /// Store an extension setting, replacing any previous value.
    pub fn set_setting(&mut self, key: impl Into<String>, value: Value) {
        let _ = self.settings.insert(key.into(), value);
    }

    /// An extension setting.
    pub fn setting(&self, key: &str) -> Option<&Value> {
        self.settings.get(key)
    }

    /// All extension settings.
    pub fn settings(&self) -> &BTreeMap<String, Value> {
        &self.settings
    }

    /// The compiler that builds this project.
    pub fn compiler(&self) -> &Arc<dyn ProjectCompiler> {
        &self.compiler
    }
}

impl fmt::Debug for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Project")
            .field("root", &self.root)
            .field("options", &self.options)
            .field("interaction_files", &self.interaction_files.len())
            .field("test_files", &self.test_files.len())
            .field("step_definitions", &self.step_definitions.len())
            .field("settings", &self.settings.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
