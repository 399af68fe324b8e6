//! Results of a test run.

use std::fmt;
use std::path::PathBuf;

/// Outcome of one step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// The step ran and succeeded.
    Passed,
    /// The step ran and failed.
    Failed(String),
    /// An earlier step in the scenario failed.
    Skipped,
}

/// Result of one scenario.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScenarioResult {
    /// Name of the owning feature.
    pub feature: String,
    /// Test file of the owning feature.
    pub file: PathBuf,
    /// Scenario name.
    pub name: String,
    /// Per-step outcomes, in step order.
    pub steps: Vec<StepOutcome>,
}

impl ScenarioResult {
    /// A scenario passes when none of its steps failed.
    pub fn passed(&self) -> bool {
        !self
            .steps
            .iter()
            .any(|s| matches!(s, StepOutcome::Failed(_)))
    }

    /// Message of the failing step, if any.
    pub fn failure(&self) -> Option<&str> {
        self.steps.iter().find_map(|s| match s {
            StepOutcome::Failed(message) => Some(message.as_str()),
            _ => None,
        })
    }
}

/// Results of every executed scenario.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Scenario results in execution order.
    pub scenarios: Vec<ScenarioResult>,
}

impl RunSummary {
    /// Number of passing scenarios.
    pub fn passed(&self) -> usize {
        self.scenarios.iter().filter(|s| s.passed()).count()
    }

    /// Number of failing scenarios.
    pub fn failed(&self) -> usize {
        self.scenarios.len() - self.passed()
    }

    /// Whether every scenario passed.
    pub fn all_passed(&self) -> bool {
        self.failed() == 0
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} scenario(s): {} passed, {} failed",
            self.scenarios.len(),
            self.passed(),
            self.failed()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(steps: Vec<StepOutcome>) -> ScenarioResult {
        ScenarioResult {
            feature: "F".into(),
            file: "a.as".into(),
            name: "S".into(),
            steps,
        }
    }

    #[test]
    fn counts_and_display() {
        let summary = RunSummary {
            scenarios: vec![
                result(vec![StepOutcome::Passed]),
                result(vec![
                    StepOutcome::Failed("boom".into()),
                    StepOutcome::Skipped,
                ]),
            ],
        };
        assert_eq!(summary.passed(), 1);
        assert_eq!(summary.failed(), 1);
        assert!(!summary.all_passed());
        assert_eq!(summary.scenarios[1].failure(), Some("boom"));
        assert_eq!(summary.to_string(), "2 scenario(s): 1 passed, 1 failed");
    }

    #[test]
    fn empty_run_passes() {
        assert!(RunSummary::default().all_passed());
    }
}
