//! The linked, executable form of a project.

use std::path::PathBuf;
use std::sync::Arc;

use crate::diagnostics::SourceLocation;
use crate::steps::{StepArguments, StepDefinition, StepKind};

/// A test step bound to exactly one definition.
#[derive(Clone, Debug)]
pub struct BoundStep {
    /// Keyword as written (`Given`, `And`, ...).
    pub keyword: String,
    /// Effective kind after `And`/`But` inheritance.
    pub kind: StepKind,
    /// Step text after the keyword.
    pub text: String,
    /// Position in the test file.
    pub location: SourceLocation,
    /// The definition the step bound to.
    pub definition: Arc<StepDefinition>,
    /// Arguments captured by the definition's pattern.
    pub arguments: StepArguments,
}

/// A scenario ready to execute.
#[derive(Clone, Debug)]
pub struct PlanScenario {
    /// Scenario name.
    pub name: String,
    /// Tags applied to the scenario.
    pub tags: Vec<String>,
    /// Steps in file order.
    pub steps: Vec<BoundStep>,
}

/// A feature ready to execute.
#[derive(Clone, Debug)]
pub struct PlanFeature {
    /// Feature name.
    pub name: String,
    /// Test file that declared the feature.
    pub file: PathBuf,
    /// Tags applied to the feature.
    pub tags: Vec<String>,
    /// Scenarios in file order.
    pub scenarios: Vec<PlanScenario>,
}

/// Every feature of a successfully linked project.
#[derive(Clone, Debug, Default)]
pub struct TestPlan {
    /// Features in file order.
    pub features: Vec<PlanFeature>,
}

impl TestPlan {
    /// Total number of scenarios.
    pub fn scenario_count(&self) -> usize {
        self.features.iter().map(|f| f.scenarios.len()).sum()
    }

    /// Total number of bound steps.
    pub fn step_count(&self) -> usize {
        self.features
            .iter()
            .flat_map(|f| &f.scenarios)
            .map(|s| s.steps.len())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steps::StepPattern;

    fn step(text: &str) -> BoundStep {
        let pattern = StepPattern::parse(text).unwrap();
        BoundStep {
            keyword: "Given".into(),
            kind: StepKind::Given,
            text: text.into(),
            location: SourceLocation::new("a.as", 1, 1),
            definition: Arc::new(StepDefinition::interaction(
                StepKind::Given,
                pattern,
                SourceLocation::new("a.asi", 1, 1),
                Vec::new(),
            )),
            arguments: StepArguments::default(),
        }
    }

    #[test]
    fn counts() {
        let plan = TestPlan {
            features: vec![PlanFeature {
                name: "F".into(),
                file: "a.as".into(),
                tags: Vec::new(),
                scenarios: vec![
                    PlanScenario {
                        name: "one".into(),
                        tags: Vec::new(),
                        steps: vec![step("a"), step("b")],
                    },
                    PlanScenario {
                        name: "two".into(),
                        tags: Vec::new(),
                        steps: vec![step("c")],
                    },
                ],
            }],
        };
        assert_eq!(plan.scenario_count(), 2);
        assert_eq!(plan.step_count(), 3);
        assert_eq!(TestPlan::default().scenario_count(), 0);
    }
}
