//! Binds test steps to step definitions.

use std::sync::Arc;

use autostep_core::{
    BoundStep, Diagnostic, Diagnostics, LinkOutcome, PlanFeature, PlanScenario, StepDefinition,
    TestPlan,
};
use tracing::trace;

use crate::ast::{Step, TestFile};

/// Link parsed test files against the available definitions.
///
/// Every step must match exactly one definition. The plan is only produced
/// when no step failed to bind.
pub fn link(files: &[TestFile], definitions: &[Arc<StepDefinition>]) -> LinkOutcome {
    let mut diagnostics = Diagnostics::new();
    let mut features = Vec::new();

    for file in files {
        let Some(feature) = &file.feature else {
            continue;
        };

        let scenarios = feature
            .scenarios
            .iter()
            .map(|scenario| PlanScenario {
                name: scenario.name.clone(),
                tags: scenario.tags.clone(),
                steps: scenario
                    .steps
                    .iter()
                    .filter_map(|step| bind_step(step, definitions, &mut diagnostics))
                    .collect(),
            })
            .collect();

        features.push(PlanFeature {
            name: feature.name.clone(),
            file: file.path.clone(),
            tags: feature.tags.clone(),
            scenarios,
        });
    }

    let plan = (!diagnostics.has_errors()).then_some(TestPlan { features });
    LinkOutcome { diagnostics, plan }
}

fn bind_step(
    step: &Step,
    definitions: &[Arc<StepDefinition>],
    diagnostics: &mut Diagnostics,
) -> Option<BoundStep> {
    let mut matches = definitions
        .iter()
        .filter_map(|def| def.bind(step.kind, &step.text).map(|args| (def, args)))
        .collect::<Vec<_>>();

    match matches.len() {
        0 => {
            diagnostics.push(
                Diagnostic::error(format!(
                    "no step definition matches '{} {}'",
                    step.keyword, step.text
                ))
                .with_location(step.location.clone()),
            );
            None
        }
        1 => {
            let (definition, arguments) = matches.remove(0);
            trace!(step = %step.text, definition = %definition, "step bound");
            Some(BoundStep {
                keyword: step.keyword.to_string(),
                kind: step.kind,
                text: step.text.clone(),
                location: step.location.clone(),
                definition: Arc::clone(definition),
                arguments,
            })
        }
        n => {
            let candidates = matches
                .iter()
                .map(|(def, _)| def.to_string())
                .collect::<Vec<_>>()
                .join("; ");
            diagnostics.push(
                Diagnostic::error(format!(
                    "step '{} {}' is ambiguous, {n} definitions match: {candidates}",
                    step.keyword, step.text
                ))
                .with_location(step.location.clone()),
            );
            None
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
