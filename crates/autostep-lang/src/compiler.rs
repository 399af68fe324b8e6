//! [`ProjectCompiler`] implementation for the AutoStep test language.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use autostep_core::{
    CompilerFault, Diagnostic, Diagnostics, LinkOutcome, Project, ProjectCompiler, StepDefinition,
};
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use crate::ast::TestFile;
use crate::interaction_parser::parse_interaction_file;
use crate::linker::link;
use crate::test_parser::parse_test_file;

#[derive(Default)]
struct CompileState {
    compiled: bool,
    test_files: Vec<TestFile>,
    definitions: Vec<Arc<StepDefinition>>,
}

/// Compiles test and interaction files, then links steps to definitions.
///
/// The result of the last compile is held until the following link.
#[derive(Default)]
pub struct LanguageCompiler {
    state: Mutex<CompileState>,
}

impl LanguageCompiler {
    /// A compiler with no compiled state.
    pub fn new() -> Self {
        Self::default()
    }
}

async fn read_source(path: &Path, cancel: &CancellationToken) -> Result<String, CompilerFault> {
    if cancel.is_cancelled() {
        return Err(CompilerFault::Cancelled);
    }
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CompilerFault::Io {
            path: path.to_path_buf(),
            source,
        })
}

#[async_trait]
impl ProjectCompiler for LanguageCompiler {
    #[instrument(skip_all, fields(root = %project.root().display()))]
    async fn compile(
        &self,
        project: &Project,
        cancel: &CancellationToken,
    ) -> Result<Diagnostics, CompilerFault> {
        let diagnostic_mode = project.options().diagnostic;
        let mut diagnostics = Diagnostics::new();
        let mut definitions = Vec::new();
        let mut test_files = Vec::new();

        for path in project.interaction_files().iter() {
            let source = read_source(path, cancel).await?;
            let parsed = parse_interaction_file(path, &source, &mut diagnostics);
            debug!(file = %path.display(), definitions = parsed.len(), "compiled interaction file");
            if diagnostic_mode {
                diagnostics.push(Diagnostic::info(format!(
                    "compiled interaction file {} ({} step definitions)",
                    path.display(),
                    parsed.len()
                )));
            }
            definitions.extend(parsed.into_iter().map(Arc::new));
        }

        for path in project.test_files().iter() {
            let source = read_source(path, cancel).await?;
            let parsed = parse_test_file(path, &source, &mut diagnostics);
            let scenarios = parsed.feature.as_ref().map_or(0, |f| f.scenarios.len());
            debug!(file = %path.display(), scenarios, "compiled test file");
            if diagnostic_mode {
                diagnostics.push(Diagnostic::info(format!(
                    "compiled test file {} ({scenarios} scenarios)",
                    path.display()
                )));
            }
            test_files.push(parsed);
        }

        // Extension definitions take part in linking alongside file definitions.
        definitions.extend(project.step_definitions().iter().cloned());

        *self.state.lock() = CompileState {
            compiled: true,
            test_files,
            definitions,
        };
        Ok(diagnostics)
    }

    #[instrument(skip_all)]
    async fn link(
        &self,
        _project: &Project,
        cancel: &CancellationToken,
    ) -> Result<LinkOutcome, CompilerFault> {
        if cancel.is_cancelled() {
            return Err(CompilerFault::Cancelled);
        }
        let state = self.state.lock();
        if !state.compiled {
            return Err(CompilerFault::NotCompiled);
        }
        Ok(link(&state.test_files, &state.definitions))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
