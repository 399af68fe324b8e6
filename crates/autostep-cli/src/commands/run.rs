//! `autostep run`
//!
//! Builds like `autostep build`; a failed build never reaches execution.
//! Before executing, every entry point may adjust the run and register the
//! services its steps need.

use autostep_extensions::ExtensionLoader;
use autostep_runner::TestRun;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::build_project;
use crate::args::ProjectArgs;
use crate::errors::CommandError;

/// Build and execute the project. Succeeds when every scenario passes.
pub async fn execute(
    args: &ProjectArgs,
    loader: &dyn ExtensionLoader,
    cancel: &CancellationToken,
) -> Result<bool, CommandError> {
    let mut built = build_project(args, loader, cancel).await?;
    if !built.verdict.success {
        warn!("build failed, tests were not executed");
        return Ok(false);
    }
    let Some(plan) = built.verdict.plan.take() else {
        warn!("link produced no test plan, tests were not executed");
        return Ok(false);
    };

    let mut run = TestRun::new(plan);
    for entry_point in built.extensions.entry_points() {
        entry_point.extend_execution(&built.config, &mut run)?;
    }
    info!(
        features = run.plan().features.len(),
        scenarios = run.plan().scenario_count(),
        "executing tests"
    );

    let config = &built.config;
    let extensions = &built.extensions;
    let summary = run
        .execute(
            |services| {
                for entry_point in extensions.entry_points() {
                    entry_point.configure_execution_services(config, services);
                }
            },
            cancel,
        )
        .await?;
    Ok(summary.all_passed())
}
