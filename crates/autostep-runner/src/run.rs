//! Sequential execution of a [`TestPlan`].

use std::sync::Arc;

use autostep_core::{BoundStep, PlanFeature, PlanScenario, StepSource, TestPlan};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::errors::{Result, RunError};
use crate::events::RunEventHandler;
use crate::services::ServiceRegistry;
use crate::summary::{RunSummary, ScenarioResult, StepOutcome};

/// A configured test run.
///
/// Extensions adjust the run (event handlers, scenario selection) before
/// [`execute`](Self::execute) consumes it.
pub struct TestRun {
    plan: TestPlan,
    handlers: Vec<Arc<dyn RunEventHandler>>,
}

impl TestRun {
    /// A run over every scenario of `plan`.
    pub fn new(plan: TestPlan) -> Self {
        Self {
            plan,
            handlers: Vec::new(),
        }
    }

    /// The plan that will execute.
    pub fn plan(&self) -> &TestPlan {
        &self.plan
    }

    /// Add an observer. Handlers are notified in registration order.
    pub fn add_event_handler(&mut self, handler: Arc<dyn RunEventHandler>) {
        debug!(name = handler.name(), "adding run event handler");
        self.handlers.push(handler);
    }

    /// Registered observers.
    pub fn event_handlers(&self) -> &[Arc<dyn RunEventHandler>] {
        &self.handlers
    }

    /// Keep only the scenarios for which `keep(feature, scenario)` returns
    /// `true`.
    ///
    /// Features left without scenarios are dropped.
    pub fn retain_scenarios<F>(&mut self, mut keep: F)
    where
        F: FnMut(&PlanFeature, &PlanScenario) -> bool,
    {
        for feature in &mut self.plan.features {
            let scenarios = std::mem::take(&mut feature.scenarios);
            let kept: Vec<_> = scenarios
                .into_iter()
                .filter(|scenario| keep(feature, scenario))
                .collect();
            feature.scenarios = kept;
        }
        self.plan.features.retain(|f| !f.scenarios.is_empty());
    }

    /// Execute every scenario in plan order.
    ///
    /// `configure_services` runs once, before the first step, to populate
    /// the [`ServiceRegistry`].
    #[instrument(skip_all, fields(scenarios = self.plan.scenario_count()))]
    pub async fn execute<F>(self, configure_services: F, cancel: &CancellationToken) -> Result<RunSummary>
    where
        F: FnOnce(&mut ServiceRegistry),
    {
        let mut services = ServiceRegistry::new();
        configure_services(&mut services);

        for handler in &self.handlers {
            handler.on_run_start(&self.plan).await;
        }

        let mut summary = RunSummary::default();
        for feature in &self.plan.features {
            for handler in &self.handlers {
                handler.on_feature_start(feature).await;
            }

            for scenario in &feature.scenarios {
                let result = self
                    .run_scenario(feature, scenario, &services, cancel, summary.scenarios.len())
                    .await?;
                if let Some(message) = result.failure() {
                    warn!(feature = %feature.name, scenario = %scenario.name, %message, "scenario failed");
                } else {
                    info!(feature = %feature.name, scenario = %scenario.name, "scenario passed");
                }
                for handler in &self.handlers {
                    handler.on_scenario_end(&result).await;
                }
                summary.scenarios.push(result);
            }

            for handler in &self.handlers {
                handler.on_feature_end(feature).await;
            }
        }

        info!("{summary}");
        for handler in &self.handlers {
            handler.on_run_end(&summary).await;
        }
        Ok(summary)
    }

    async fn run_scenario(
        &self,
        feature: &PlanFeature,
        scenario: &PlanScenario,
        services: &ServiceRegistry,
        cancel: &CancellationToken,
        completed: usize,
    ) -> Result<ScenarioResult> {
        for handler in &self.handlers {
            handler.on_scenario_start(feature, scenario).await;
        }

        let mut steps = Vec::with_capacity(scenario.steps.len());
        let mut failed = false;
        for step in &scenario.steps {
            if cancel.is_cancelled() {
                return Err(RunError::Cancelled { completed });
            }
            let outcome = if failed {
                StepOutcome::Skipped
            } else {
                execute_step(step, services).await
            };
            failed |= matches!(outcome, StepOutcome::Failed(_));
            for handler in &self.handlers {
                handler.on_step(step, &outcome).await;
            }
            steps.push(outcome);
        }

        Ok(ScenarioResult {
            feature: feature.name.clone(),
            file: feature.file.clone(),
            name: scenario.name.clone(),
            steps,
        })
    }
}

async fn execute_step(step: &BoundStep, services: &ServiceRegistry) -> StepOutcome {
    let result = if let Some(handler) = &step.definition.handler {
        handler.invoke(&step.arguments).await
    } else if let (StepSource::Interaction { .. }, Some(executor)) =
        (&step.definition.source, services.interaction_executor())
    {
        executor.execute(step).await
    } else {
        return StepOutcome::Failed(format!(
            "no implementation for step '{} {}'",
            step.keyword, step.text
        ));
    };

    match result {
        Ok(()) => {
            debug!(step = %step.text, "step passed");
            StepOutcome::Passed
        }
        Err(failure) => StepOutcome::Failed(failure.message),
    }
}

impl std::fmt::Debug for TestRun {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestRun")
            .field("scenarios", &self.plan.scenario_count())
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
