//! The set of loaded extensions for one command.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::entry_point::ExtensionEntryPoint;

/// A package that was loaded.
#[derive(Clone)]
pub struct LoadedExtension {
    /// Package identifier.
    pub package: String,
    /// Installed version.
    pub version: String,
    /// Entry point, absent for content-only packages.
    pub entry_point: Option<Arc<dyn ExtensionEntryPoint>>,
}

impl fmt::Debug for LoadedExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedExtension")
            .field("package", &self.package)
            .field("version", &self.version)
            .field("entry_point", &self.entry_point.as_ref().map(|e| e.name()))
            .finish()
    }
}

/// Loaded extensions plus the directory their content was installed into.
///
/// Dropping the handle calls [`unload`](ExtensionEntryPoint::unload) on every
/// entry point in reverse load order.
pub struct ExtensionHandle {
    root: PathBuf,
    extensions: Vec<LoadedExtension>,
}

impl ExtensionHandle {
    /// A handle with nothing loaded.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extensions: Vec::new(),
        }
    }

    /// Record a loaded package.
    pub fn push(&mut self, extension: LoadedExtension) {
        self.extensions.push(extension);
    }

    /// Directory holding installed extension content.
    pub fn extensions_root(&self) -> &Path {
        &self.root
    }

    /// Loaded packages in load order.
    pub fn extensions(&self) -> &[LoadedExtension] {
        &self.extensions
    }

    /// Entry points in load order.
    pub fn entry_points(&self) -> impl Iterator<Item = &Arc<dyn ExtensionEntryPoint>> {
        self.extensions.iter().filter_map(|e| e.entry_point.as_ref())
    }

    /// Whether nothing was loaded.
    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }
}

impl Drop for ExtensionHandle {
    fn drop(&mut self) {
        for extension in self.extensions.iter().rev() {
            if let Some(entry_point) = &extension.entry_point {
                debug!(package = %extension.package, name = entry_point.name(), "unloading extension");
                entry_point.unload();
            }
        }
    }
}

impl fmt::Debug for ExtensionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionHandle")
            .field("root", &self.root)
            .field("extensions", &self.extensions)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    struct Tracked {
        name: &'static str,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    impl ExtensionEntryPoint for Tracked {
        fn name(&self) -> &str {
            self.name
        }
        fn unload(&self) {
            self.log.lock().push(self.name);
        }
    }

    fn loaded(name: &'static str, log: &Arc<Mutex<Vec<&'static str>>>) -> LoadedExtension {
        LoadedExtension {
            package: name.into(),
            version: "1.0.0".into(),
            entry_point: Some(Arc::new(Tracked {
                name,
                log: Arc::clone(log),
            })),
        }
    }

    #[test]
    fn drop_unloads_in_reverse_order_once() {
        let log = Arc::new(Mutex::new(Vec::new()));
        {
            let mut handle = ExtensionHandle::new("/p/.autostep/extensions");
            handle.push(loaded("first", &log));
            handle.push(LoadedExtension {
                package: "content-only".into(),
                version: "1.0.0".into(),
                entry_point: None,
            });
            handle.push(loaded("second", &log));
            assert_eq!(handle.entry_points().count(), 2);
        }
        assert_eq!(*log.lock(), vec!["second", "first"]);
    }
}
