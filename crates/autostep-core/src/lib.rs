//! # autostep-core
//!
//! Shared vocabulary of the AutoStep build pipeline:
//!
//! - **Diagnostics**: [`Diagnostic`], [`Severity`], [`Diagnostics`]
//! - **File sets**: glob-selected, deduplicated file collections ([`FileSet`])
//! - **Steps**: [`StepKind`], [`StepPattern`], [`StepDefinition`], [`StepHandler`]
//! - **Project model**: [`Project`] and the [`ProjectCompiler`] seam
//! - **Test plan**: the linked form of a project ([`TestPlan`])
//! - **Logging**: subscriber setup and in-memory capture for tests

#![deny(unsafe_code)]

pub mod compiler;
pub mod diagnostics;
pub mod errors;
pub mod fileset;
pub mod logging;
pub mod plan;
pub mod project;
pub mod steps;

pub use compiler::{LinkOutcome, ProjectCompiler};
pub use diagnostics::{Diagnostic, Diagnostics, Severity, SourceLocation};
pub use errors::{CompilerFault, FileSetError, PatternError, StepFailure};
pub use fileset::FileSet;
pub use plan::{BoundStep, PlanFeature, PlanScenario, TestPlan};
pub use project::{Project, ProjectOptions};
pub use steps::{StepArguments, StepDefinition, StepHandler, StepKind, StepPattern, StepSource};

/// Extension of test files.
pub const TEST_FILE_EXTENSION: &str = "as";

/// Extension of interaction files.
pub const INTERACTION_FILE_EXTENSION: &str = "asi";
