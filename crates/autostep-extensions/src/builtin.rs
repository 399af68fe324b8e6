//! Entry points compiled into the binary.
//!
//! `console` gives projects a working execution path without any other
//! extension: interaction-file steps print their body, `I log {message}`
//! steps print their argument, and scenario results are reported as they
//! finish. A `console:tags` list restricts the run to scenarios that carry,
//! or whose feature carries, one of the listed tags.

use std::sync::Arc;

use async_trait::async_trait;
use autostep_config::ResolvedConfiguration;
use autostep_core::{
    BoundStep, Project, StepArguments, StepDefinition, StepFailure, StepHandler, StepKind,
    StepPattern, StepSource,
};
use autostep_runner::{InteractionExecutor, RunEventHandler, ScenarioResult, ServiceRegistry, TestRun};
use tracing::{debug, info, warn};

use crate::entry_point::{EntryPointCatalog, ExtensionEntryPoint};
use crate::errors::{ExtensionError, Result};

/// Catalog id of the console entry point.
pub const CONSOLE_ENTRY_POINT: &str = "console";

/// Catalog with every built-in entry point registered.
pub fn builtin_catalog() -> EntryPointCatalog {
    let mut catalog = EntryPointCatalog::new();
    catalog.register(CONSOLE_ENTRY_POINT, || Arc::new(ConsoleEntryPoint));
    catalog
}

/// The `console` entry point.
#[derive(Debug, Default)]
pub struct ConsoleEntryPoint;

impl ExtensionEntryPoint for ConsoleEntryPoint {
    fn name(&self) -> &str {
        CONSOLE_ENTRY_POINT
    }

    fn attach_to_project(&self, _config: &ResolvedConfiguration, project: &mut Project) -> Result<()> {
        let pattern = StepPattern::parse("I log {message}")
            .map_err(|e| ExtensionError::entry_point(CONSOLE_ENTRY_POINT, e.to_string()))?;
        for kind in [StepKind::Given, StepKind::When, StepKind::Then] {
            project.register_step(StepDefinition::extension(
                CONSOLE_ENTRY_POINT,
                kind,
                pattern.clone(),
                Arc::new(LogStep),
            ));
        }
        Ok(())
    }

    fn extend_execution(&self, config: &ResolvedConfiguration, run: &mut TestRun) -> Result<()> {
        if let Some(tags) = config.get_string_list("console:tags")? {
            run.retain_scenarios(|feature, scenario| {
                feature.tags.iter().chain(&scenario.tags).any(|t| tags.contains(t))
            });
            debug!(?tags, remaining = run.plan().scenario_count(), "filtered scenarios by tag");
        }
        run.add_event_handler(Arc::new(ConsoleReporter));
        Ok(())
    }

    fn configure_execution_services(&self, _config: &ResolvedConfiguration, services: &mut ServiceRegistry) {
        services.register_interaction_executor(Arc::new(ConsoleExecutor));
    }

    fn unload(&self) {
        debug!("console extension unloaded");
    }
}

struct LogStep;

#[async_trait]
impl StepHandler for LogStep {
    async fn invoke(&self, arguments: &StepArguments) -> std::result::Result<(), StepFailure> {
        let message = arguments
            .get("message")
            .ok_or_else(|| StepFailure::new("missing message argument"))?;
        info!("{message}");
        Ok(())
    }
}

/// Prints interaction step bodies with arguments substituted.
struct ConsoleExecutor;

#[async_trait]
impl InteractionExecutor for ConsoleExecutor {
    fn name(&self) -> &str {
        CONSOLE_ENTRY_POINT
    }

    async fn execute(&self, step: &BoundStep) -> std::result::Result<(), StepFailure> {
        let StepSource::Interaction { body, .. } = &step.definition.source else {
            return Err(StepFailure::new("not an interaction step"));
        };
        info!(step = %step.text, "{} {}", step.keyword, step.text);
        for line in body {
            info!("  {}", substitute(line, &step.arguments));
        }
        Ok(())
    }
}

fn substitute(line: &str, arguments: &StepArguments) -> String {
    arguments.iter().fold(line.to_owned(), |acc, (name, value)| {
        acc.replace(&format!("{{{name}}}"), value)
    })
}

struct ConsoleReporter;

#[async_trait]
impl RunEventHandler for ConsoleReporter {
    fn name(&self) -> &str {
        CONSOLE_ENTRY_POINT
    }

    async fn on_scenario_end(&self, result: &ScenarioResult) {
        match result.failure() {
            None => info!("PASS {} / {}", result.feature, result.name),
            Some(message) => warn!("FAIL {} / {}: {message}", result.feature, result.name),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
