//! Run event handlers.
//!
//! Handlers observe the run; they cannot change its outcome. Every method
//! has a no-op default so implementations override only what they need.

use async_trait::async_trait;
use autostep_core::{BoundStep, PlanFeature, PlanScenario, TestPlan};

use crate::summary::{RunSummary, ScenarioResult, StepOutcome};

/// Observer of test run progress.
#[async_trait]
pub trait RunEventHandler: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Before the first feature.
    async fn on_run_start(&self, _plan: &TestPlan) {}

    /// Before a feature's first scenario.
    async fn on_feature_start(&self, _feature: &PlanFeature) {}

    /// Before a scenario's first step.
    async fn on_scenario_start(&self, _feature: &PlanFeature, _scenario: &PlanScenario) {}

    /// After each step, including skipped ones.
    async fn on_step(&self, _step: &BoundStep, _outcome: &StepOutcome) {}

    /// After a scenario's last step.
    async fn on_scenario_end(&self, _result: &ScenarioResult) {}

    /// After a feature's last scenario.
    async fn on_feature_end(&self, _feature: &PlanFeature) {}

    /// After the last feature.
    async fn on_run_end(&self, _summary: &RunSummary) {}
}
