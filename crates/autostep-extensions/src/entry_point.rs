//! Extension entry points and the catalog they are created from.
//!
//! An entry point is the capability set an extension exposes to the
//! pipeline. Implementations are compiled into the binary and registered in
//! an [`EntryPointCatalog`] under the id that package metadata refers to.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use autostep_config::ResolvedConfiguration;
use autostep_core::Project;
use autostep_runner::{ServiceRegistry, TestRun};
use tracing::debug;

use crate::errors::Result;

/// Capabilities an extension contributes.
///
/// Every hook has a no-op default.
pub trait ExtensionEntryPoint: Send + Sync {
    /// Name used in logs and errors.
    fn name(&self) -> &str;

    /// Contribute to the project before its files are assembled.
    fn attach_to_project(&self, _config: &ResolvedConfiguration, _project: &mut Project) -> Result<()> {
        Ok(())
    }

    /// Adjust a test run before it executes.
    fn extend_execution(&self, _config: &ResolvedConfiguration, _run: &mut TestRun) -> Result<()> {
        Ok(())
    }

    /// Register services used while steps execute.
    fn configure_execution_services(
        &self,
        _config: &ResolvedConfiguration,
        _services: &mut ServiceRegistry,
    ) {
    }

    /// Release resources. Called once, when the owning handle is dropped.
    fn unload(&self) {}
}

/// Creates an entry point instance.
pub type EntryPointFactory = Arc<dyn Fn() -> Arc<dyn ExtensionEntryPoint> + Send + Sync>;

/// Registry of entry point factories keyed by catalog id.
#[derive(Clone, Default)]
pub struct EntryPointCatalog {
    factories: BTreeMap<String, EntryPointFactory>,
}

impl EntryPointCatalog {
    /// An empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory, replacing any previous one with the same id.
    pub fn register<F>(&mut self, id: impl Into<String>, factory: F)
    where
        F: Fn() -> Arc<dyn ExtensionEntryPoint> + Send + Sync + 'static,
    {
        let id = id.into();
        debug!(id = %id, "registering extension entry point");
        let _ = self.factories.insert(id, Arc::new(factory));
    }

    /// Instantiate the entry point registered under `id`.
    pub fn create(&self, id: &str) -> Option<Arc<dyn ExtensionEntryPoint>> {
        self.factories.get(id).map(|factory| factory())
    }

    /// Whether `id` is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.factories.contains_key(id)
    }

    /// Registered ids, sorted.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }
}

impl fmt::Debug for EntryPointCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryPointCatalog")
            .field("ids", &self.ids().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named(String);

    impl ExtensionEntryPoint for Named {
        fn name(&self) -> &str {
            &self.0
        }
    }

    #[test]
    fn creates_fresh_instances() {
        let mut catalog = EntryPointCatalog::new();
        catalog.register("web", || Arc::new(Named("web".into())));
        let a = catalog.create("web").unwrap();
        let b = catalog.create("web").unwrap();
        assert_eq!(a.name(), "web");
        assert!(!Arc::ptr_eq(&a, &b));
        assert!(catalog.create("missing").is_none());
        assert!(catalog.contains("web"));
    }

    #[test]
    fn ids_are_sorted() {
        let mut catalog = EntryPointCatalog::new();
        catalog.register("b", || Arc::new(Named("b".into())));
        catalog.register("a", || Arc::new(Named("a".into())));
        assert_eq!(catalog.ids().collect::<Vec<_>>(), vec!["a", "b"]);
    }
}
