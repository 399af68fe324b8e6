//! Compile, link and report.
//!
//! The link phase always runs, even after a failed compile, so one build
//! reports every problem in the project. Diagnostics are never errors here;
//! only compiler faults and cancellation end a build early.

use autostep_core::{Diagnostics, LinkOutcome, Project, Severity, TestPlan};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument};

use crate::errors::Result;

/// Level a diagnostic is logged at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportLevel {
    /// Logged with `error!`.
    Error,
    /// Logged with `info!`.
    Info,
}

/// Severity to report level.
pub const fn report_level(severity: Severity) -> ReportLevel {
    match severity {
        Severity::Error => ReportLevel::Error,
        Severity::Warning | Severity::Info => ReportLevel::Info,
    }
}

/// Log every diagnostic at its report level.
pub fn report_diagnostics(diagnostics: &Diagnostics) {
    for diagnostic in diagnostics.iter() {
        match report_level(diagnostic.severity) {
            ReportLevel::Error => error!("{diagnostic}"),
            ReportLevel::Info => info!("{diagnostic}"),
        }
    }
}

/// Outcome of a build.
#[derive(Debug, Default)]
pub struct BuildVerdict {
    /// Diagnostics from the compile phase.
    pub compile_diagnostics: Diagnostics,
    /// Diagnostics from the link phase.
    pub link_diagnostics: Diagnostics,
    /// No error-level diagnostic in either phase.
    pub success: bool,
    /// The linked plan, when linking produced one.
    pub plan: Option<TestPlan>,
}

/// Compile and link `project`, reporting every diagnostic.
#[instrument(skip_all, fields(project = %project.root().display()))]
pub async fn build_and_report(project: &Project, cancel: &CancellationToken) -> Result<BuildVerdict> {
    let compiler = project.compiler();

    let compile_diagnostics = compiler.compile(project, cancel).await?;
    report_diagnostics(&compile_diagnostics);
    let compiled = !compile_diagnostics.has_errors();
    if compiled {
        info!("Project compiled successfully.");
    }

    let LinkOutcome {
        diagnostics: link_diagnostics,
        plan,
    } = compiler.link(project, cancel).await?;
    report_diagnostics(&link_diagnostics);

    let success = compiled && !link_diagnostics.has_errors();
    if success {
        info!("Link complete: all steps bound successfully.");
    } else {
        error!(
            errors = compile_diagnostics.error_count() + link_diagnostics.error_count(),
            "build failed"
        );
    }

    Ok(BuildVerdict {
        compile_diagnostics,
        link_diagnostics,
        success,
        plan,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use autostep_core::logging::capture_logs;
    use autostep_core::{CompilerFault, Diagnostic, ProjectCompiler, ProjectOptions};
    use std::path::Path;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tracing::Level;

    use crate::errors::BuildError;

    #[derive(Default)]
    struct Scripted {
        compile: Vec<Diagnostic>,
        link: Vec<Diagnostic>,
        fault: bool,
        link_calls: AtomicUsize,
    }

    #[async_trait]
    impl ProjectCompiler for Scripted {
        async fn compile(
            &self,
            _project: &Project,
            cancel: &CancellationToken,
        ) -> std::result::Result<Diagnostics, CompilerFault> {
            if cancel.is_cancelled() {
                return Err(CompilerFault::Cancelled);
            }
            if self.fault {
                return Err(CompilerFault::NotCompiled);
            }
            Ok(self.compile.clone().into())
        }

        async fn link(
            &self,
            _project: &Project,
            _cancel: &CancellationToken,
        ) -> std::result::Result<LinkOutcome, CompilerFault> {
            let _ = self.link_calls.fetch_add(1, Ordering::SeqCst);
            let diagnostics: Diagnostics = self.link.clone().into();
            let plan = (!diagnostics.has_errors()).then(TestPlan::default);
            Ok(LinkOutcome { diagnostics, plan })
        }
    }

    fn project(compiler: &Arc<Scripted>) -> Project {
        let compiler: Arc<dyn ProjectCompiler> = compiler.clone();
        Project::new("/project", ProjectOptions::default(), compiler)
    }

    #[tokio::test]
    async fn link_error_fails_build() {
        let (logs, _guard) = capture_logs();
        let compiler = Arc::new(Scripted {
            compile: vec![Diagnostic::info("compiled a.as")],
            link: vec![Diagnostic::error("no step definition matches 'Given x'").at(Path::new("a.as"), 3, 5)],
            ..Scripted::default()
        });

        let verdict = build_and_report(&project(&compiler), &CancellationToken::new())
            .await
            .unwrap();

        assert!(!verdict.success);
        assert_eq!(verdict.compile_diagnostics.len(), 1);
        assert!(verdict.link_diagnostics.has_errors());
        assert!(verdict.plan.is_none());
        assert!(logs.has_message("Project compiled successfully."));
        assert!(logs.has_event(Level::ERROR, "a.as(3,5): error: no step definition matches"));
        assert!(logs.has_event(Level::INFO, "compiled a.as"));
        assert!(!logs.has_message("all steps bound successfully"));
    }

    #[tokio::test]
    async fn clean_build_succeeds() {
        let (logs, _guard) = capture_logs();
        let compiler = Arc::new(Scripted::default());

        let verdict = build_and_report(&project(&compiler), &CancellationToken::new())
            .await
            .unwrap();

        assert!(verdict.success);
        assert!(verdict.plan.is_some());
        assert!(logs.has_message("Project compiled successfully."));
        assert!(logs.has_message("Link complete: all steps bound successfully."));
        assert_eq!(logs.count_at_level(Level::ERROR), 0);
    }

    #[tokio::test]
    async fn link_runs_after_compile_errors() {
        let (logs, _guard) = capture_logs();
        let compiler = Arc::new(Scripted {
            compile: vec![Diagnostic::error("Scenario has no name")],
            ..Scripted::default()
        });

        let verdict = build_and_report(&project(&compiler), &CancellationToken::new())
            .await
            .unwrap();

        assert!(!verdict.success);
        assert_eq!(compiler.link_calls.load(Ordering::SeqCst), 1);
        assert!(!logs.has_message("compiled successfully"));
        assert!(!logs.has_message("all steps bound successfully"));
    }

    #[tokio::test]
    async fn warnings_are_reported_at_info() {
        let (logs, _guard) = capture_logs();
        let compiler = Arc::new(Scripted {
            compile: vec![Diagnostic::warning("test file contains no Feature")],
            ..Scripted::default()
        });

        let verdict = build_and_report(&project(&compiler), &CancellationToken::new())
            .await
            .unwrap();

        assert!(verdict.success);
        assert!(logs.has_event(Level::INFO, "warning: test file contains no Feature"));
    }

    #[tokio::test]
    async fn faults_and_cancellation() {
        let compiler = Arc::new(Scripted {
            fault: true,
            ..Scripted::default()
        });
        assert_matches!(
            build_and_report(&project(&compiler), &CancellationToken::new()).await,
            Err(BuildError::Compiler(CompilerFault::NotCompiled))
        );

        let cancel = CancellationToken::new();
        cancel.cancel();
        let compiler = Arc::new(Scripted::default());
        assert_matches!(
            build_and_report(&project(&compiler), &cancel).await,
            Err(BuildError::Cancelled)
        );
        assert_eq!(compiler.link_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn severity_table() {
        assert_eq!(report_level(Severity::Error), ReportLevel::Error);
        assert_eq!(report_level(Severity::Warning), ReportLevel::Info);
        assert_eq!(report_level(Severity::Info), ReportLevel::Info);
    }
}
