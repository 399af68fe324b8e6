//! The compile/link seam.
//!
//! The build orchestrator only knows this trait; the language front end
//! implements it. Problems in project files come back as [`Diagnostics`],
//! while [`CompilerFault`] is reserved for infrastructure failures.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::diagnostics::Diagnostics;
use crate::errors::CompilerFault;
use crate::plan::TestPlan;
use crate::project::Project;

/// Result of the link phase.
#[derive(Debug, Default)]
pub struct LinkOutcome {
    /// Link diagnostics.
    pub diagnostics: Diagnostics,
    /// The executable plan, when every step bound.
    pub plan: Option<TestPlan>,
}

/// Compiles and links a [`Project`].
#[async_trait]
pub trait ProjectCompiler: Send + Sync {
    /// Parse every project file, returning compile diagnostics.
    async fn compile(
        &self,
        project: &Project,
        cancel: &CancellationToken,
    ) -> Result<Diagnostics, CompilerFault>;

    /// Bind every compiled test step to a definition.
    ///
    /// Called after [`compile`](Self::compile) even when compilation
    /// reported errors.
    async fn link(
        &self,
        project: &Project,
        cancel: &CancellationToken,
    ) -> Result<LinkOutcome, CompilerFault>;
}
