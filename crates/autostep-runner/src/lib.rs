//! # autostep-runner
//!
//! Executes a linked [`TestPlan`](autostep_core::TestPlan).
//!
//! Features and scenarios run sequentially in plan order. A step runs its
//! definition's handler if it has one, otherwise the registered
//! [`InteractionExecutor`] for interaction-file steps. A failed step fails
//! its scenario and skips the scenario's remaining steps.

#![deny(unsafe_code)]

pub mod errors;
pub mod events;
pub mod run;
pub mod services;
pub mod summary;

pub use errors::{Result, RunError};
pub use events::RunEventHandler;
pub use run::TestRun;
pub use services::{InteractionExecutor, ServiceRegistry};
pub use summary::{RunSummary, ScenarioResult, StepOutcome};
