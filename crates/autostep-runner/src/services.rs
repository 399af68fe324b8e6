//! Services available to steps during execution.
//!
//! Extensions register services through the configuration callback passed
//! to [`TestRun::execute`](crate::run::TestRun::execute).

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use autostep_core::{BoundStep, StepFailure};
use tracing::debug;

/// Executes steps declared in interaction files.
#[async_trait]
pub trait InteractionExecutor: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Run an interaction-file step.
    async fn execute(&self, step: &BoundStep) -> Result<(), StepFailure>;
}

/// Registry of execution services.
#[derive(Default)]
pub struct ServiceRegistry {
    interaction_executor: Option<Arc<dyn InteractionExecutor>>,
}

impl ServiceRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the executor for interaction-file steps, replacing any
    /// previous one.
    pub fn register_interaction_executor(&mut self, executor: Arc<dyn InteractionExecutor>) {
        debug!(name = executor.name(), "registering interaction executor");
        self.interaction_executor = Some(executor);
    }

    /// The registered interaction executor.
    pub fn interaction_executor(&self) -> Option<&Arc<dyn InteractionExecutor>> {
        self.interaction_executor.as_ref()
    }
}

impl fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceRegistry")
            .field(
                "interaction_executor",
                &self.interaction_executor.as_ref().map(|e| e.name().to_owned()),
            )
            .finish()
    }
}
