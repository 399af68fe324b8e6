//! Extension discovery and installation.
//!
//! Resolution flow for each requested package, in manifest order:
//! 1. Find `<source>/<package>/extension.json` or
//!    `<source>/.autostep/packages/<package>/extension.json` in the first
//!    local source that has one
//! 2. Check the version against the request's pre-release setting
//! 3. Copy the package's `content/` into `<extensions root>/<package>/content`
//! 4. Instantiate the entry point named by the metadata from the catalog
//!
//! Entry points are instantiated last so that a failing package never
//! leaves an instance outside the handle.
//!
//! Package names must be a single directory name. Before anything is
//! installed, directories under the extensions root that belong to packages
//! no longer in the manifest are removed, so only requested content is
//! assembled into the project.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use autostep_config::ExtensionRequest;
use autostep_core::{Diagnostic, Diagnostics};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};
use walkdir::WalkDir;

use crate::entry_point::EntryPointCatalog;
use crate::errors::{ExtensionError, Result};
use crate::handle::{ExtensionHandle, LoadedExtension};
use crate::metadata::{CONTENT_DIR, METADATA_FILE_NAME, PackageMetadata};
use crate::sources::{ExtensionManifest, STATE_DIR, SourceSettings};

/// Loads the extensions a project asks for.
#[async_trait]
pub trait ExtensionLoader: Send + Sync {
    /// Load every package in `manifest`.
    ///
    /// Non-fatal observations are appended to `diagnostics`. On error or
    /// cancellation, entry points instantiated so far are unloaded before
    /// returning.
    async fn load(
        &self,
        sources: &SourceSettings,
        manifest: &ExtensionManifest,
        diagnostics: &mut Diagnostics,
        cancel: &CancellationToken,
    ) -> Result<ExtensionHandle>;
}

/// Loads packages from local directories.
#[derive(Clone, Debug, Default)]
pub struct LocalExtensionLoader {
    catalog: Arc<EntryPointCatalog>,
}

impl LocalExtensionLoader {
    /// A loader resolving entry points from `catalog`.
    pub fn new(catalog: Arc<EntryPointCatalog>) -> Self {
        Self { catalog }
    }

    async fn load_package(
        &self,
        request: &ExtensionRequest,
        sources: &SourceSettings,
        root: &Path,
        cancel: &CancellationToken,
    ) -> Result<LoadedExtension> {
        let package_dir = find_package(&request.package, sources).ok_or_else(|| {
            ExtensionError::PackageNotFound {
                package: request.package.clone(),
                searched: sources.local_dirs().map(Path::to_path_buf).collect(),
                feeds: sources.feeds().map(str::to_owned).collect(),
            }
        })?;

        let metadata =
            PackageMetadata::read(&request.package, &package_dir.join(METADATA_FILE_NAME)).await?;
        if metadata.is_prerelease() && !request.prerelease {
            return Err(ExtensionError::Prerelease {
                package: request.package.clone(),
                version: metadata.version,
            });
        }

        install_content(&request.package, &package_dir, &root.join(&request.package)).await?;
        if cancel.is_cancelled() {
            return Err(ExtensionError::Cancelled);
        }

        let entry_point = match &metadata.entry_point {
            Some(id) => Some(self.catalog.create(id).ok_or_else(|| {
                ExtensionError::UnknownEntryPoint {
                    package: request.package.clone(),
                    entry_point: id.clone(),
                }
            })?),
            None => None,
        };

        info!(package = %request.package, version = %metadata.version, "loaded extension");
        Ok(LoadedExtension {
            package: request.package.clone(),
            version: metadata.version,
            entry_point,
        })
    }
}

#[async_trait]
impl ExtensionLoader for LocalExtensionLoader {
    #[instrument(skip_all, fields(packages = manifest.extensions.len()))]
    async fn load(
        &self,
        sources: &SourceSettings,
        manifest: &ExtensionManifest,
        diagnostics: &mut Diagnostics,
        cancel: &CancellationToken,
    ) -> Result<ExtensionHandle> {
        for request in &manifest.extensions {
            validate_package_name(&request.package)?;
        }

        let root = sources.extensions_root();
        prune_stale_content(&root, manifest).await?;
        let mut handle = ExtensionHandle::new(&root);
        if manifest.is_empty() {
            return Ok(handle);
        }

        for feed in sources.feeds() {
            diagnostics.push(Diagnostic::warning(format!(
                "package feed '{feed}' is not supported by the local loader and was skipped"
            )));
        }

        for request in &manifest.extensions {
            if cancel.is_cancelled() {
                return Err(ExtensionError::Cancelled);
            }
            // An early return drops `handle`, unloading what was loaded so far.
            let loaded = self.load_package(request, sources, &root, cancel).await?;
            handle.push(loaded);
        }

        Ok(handle)
    }
}

fn validate_package_name(package: &str) -> Result<()> {
    let mut components = Path::new(package).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(name)), None) if name == package => Ok(()),
        _ => Err(ExtensionError::InvalidPackageName {
            package: package.to_owned(),
        }),
    }
}

/// Remove every directory under `root` that is not a requested package.
async fn prune_stale_content(root: &Path, manifest: &ExtensionManifest) -> Result<()> {
    let mut entries = match tokio::fs::read_dir(root).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(prune_error(root)(e)),
    };
    while let Some(entry) = entries.next_entry().await.map_err(prune_error(root))? {
        let name = entry.file_name();
        if manifest.extensions.iter().any(|r| name == r.package.as_str()) {
            continue;
        }
        let path = entry.path();
        let file_type = entry.file_type().await.map_err(prune_error(&path))?;
        if file_type.is_dir() {
            tokio::fs::remove_dir_all(&path).await.map_err(prune_error(&path))?;
            debug!(path = %path.display(), "removed content of unrequested extension");
        }
    }
    Ok(())
}

fn prune_error(path: &Path) -> impl FnOnce(std::io::Error) -> ExtensionError {
    let path = path.to_path_buf();
    move |source| ExtensionError::Prune { path, source }
}

fn find_package(package: &str, sources: &SourceSettings) -> Option<PathBuf> {
    sources.local_dirs().find_map(|dir| {
        [
            dir.join(package),
            dir.join(STATE_DIR).join("packages").join(package),
        ]
        .into_iter()
        .find(|candidate| candidate.join(METADATA_FILE_NAME).is_file())
    })
}

/// Replace `<target>/content` with a copy of `<package_dir>/content`.
async fn install_content(package: &str, package_dir: &Path, target: &Path) -> Result<()> {
    let io_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source| ExtensionError::Io {
            package: package.to_owned(),
            path,
            source,
        }
    };

    let destination = target.join(CONTENT_DIR);
    if destination.exists() {
        tokio::fs::remove_dir_all(&destination)
            .await
            .map_err(io_err(&destination))?;
    }

    let content = package_dir.join(CONTENT_DIR);
    if !content.is_dir() {
        debug!(package, "package has no content directory");
        return Ok(());
    }

    let entries = WalkDir::new(&content)
        .into_iter()
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| ExtensionError::Io {
            package: package.to_owned(),
            path: content.clone(),
            source: e.into(),
        })?;

    let mut copied = 0usize;
    for entry in entries {
        let Ok(relative) = entry.path().strip_prefix(&content) else {
            continue;
        };
        let dest = destination.join(relative);
        if entry.file_type().is_dir() {
            tokio::fs::create_dir_all(&dest).await.map_err(io_err(&dest))?;
        } else if entry.file_type().is_file() {
            let _ = tokio::fs::copy(entry.path(), &dest)
                .await
                .map_err(io_err(&dest))?;
            copied += 1;
        }
    }

    debug!(package, files = copied, destination = %destination.display(), "installed extension content");
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry_point::ExtensionEntryPoint;
    use assert_matches::assert_matches;
    use parking_lot::Mutex;

    struct Tracked {
        name: String,
        unloaded: Arc<Mutex<Vec<String>>>,
    }

    impl ExtensionEntryPoint for Tracked {
        fn name(&self) -> &str {
            &self.name
        }
        fn unload(&self) {
            self.unloaded.lock().push(self.name.clone());
        }
    }

    fn catalog(unloaded: &Arc<Mutex<Vec<String>>>) -> Arc<EntryPointCatalog> {
        let mut catalog = EntryPointCatalog::new();
        for id in ["alpha", "beta"] {
            let unloaded = Arc::clone(unloaded);
            catalog.register(id, move || {
                Arc::new(Tracked {
                    name: id.to_owned(),
                    unloaded: Arc::clone(&unloaded),
                })
            });
        }
        Arc::new(catalog)
    }

    fn write_package(dir: &Path, version: &str, entry_point: Option<&str>) {
        std::fs::create_dir_all(dir.join("content/steps")).unwrap();
        let meta = match entry_point {
            Some(id) => format!(r#"{{"version": "{version}", "entryPoint": "{id}"}}"#),
            None => format!(r#"{{"version": "{version}"}}"#),
        };
        std::fs::write(dir.join(METADATA_FILE_NAME), meta).unwrap();
        std::fs::write(dir.join("content/steps/web.asi"), "Step: Given a browser\n").unwrap();
    }

    fn request(package: &str, prerelease: bool) -> ExtensionRequest {
        ExtensionRequest {
            package: package.into(),
            prerelease,
        }
    }

    fn manifest(requests: Vec<ExtensionRequest>) -> ExtensionManifest {
        ExtensionManifest {
            extensions: requests,
        }
    }

    #[tokio::test]
    async fn empty_manifest_loads_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let loader = LocalExtensionLoader::default();
        let mut diags = Diagnostics::new();
        let handle = loader
            .load(
                &SourceSettings::new(dir.path()),
                &ExtensionManifest::default(),
                &mut diags,
                &CancellationToken::new(),
            )
            .await
            .unwrap();
        assert!(handle.is_empty());
        assert!(!dir.path().join(".autostep").exists());
    }

    #[tokio::test]
    async fn installs_content_and_instantiates_in_order() {
        let dir = tempfile::tempdir().unwrap();
        write_package(&dir.path().join("Beta"), "1.0.0", Some("beta"));
        write_package(&dir.path().join(".autostep/packages/Alpha"), "2.0.0-rc1", Some("alpha"));
        let unloaded = Arc::new(Mutex::new(Vec::new()));
        let loader = LocalExtensionLoader::new(catalog(&unloaded));
        let mut diags = Diagnostics::new();

        let handle = loader
            .load(
                &SourceSettings::new(dir.path()),
                &manifest(vec![request("Beta", false), request("Alpha", true)]),
                &mut diags,
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        let names: Vec<_> = handle.entry_points().map(|e| e.name().to_owned()).collect();
        assert_eq!(names, vec!["beta", "alpha"]);
        assert!(
            handle
                .extensions_root()
                .join("Beta/content/steps/web.asi")
                .is_file()
        );
        assert!(handle.extensions_root().join("Alpha/content/steps/web.asi").is_file());

        drop(handle);
        assert_eq!(*unloaded.lock(), vec!["alpha", "beta"]);
    }

    #[tokio::test]
    async fn reinstall_replaces_previous_content() {
        let dir = tempfile::tempdir().unwrap();
        write_package(&dir.path().join("Pkg"), "1.0.0", None);
        let stale = dir.path().join(".autostep/extensions/Pkg/content/old.as");
        std::fs::create_dir_all(stale.parent().unwrap()).unwrap();
        std::fs::write(&stale, "").unwrap();

        let loader = LocalExtensionLoader::default();
        let handle = loader
            .load(
                &SourceSettings::new(dir.path()),
                &manifest(vec![request("Pkg", false)]),
                &mut Diagnostics::new(),
                &CancellationToken::new(),
            )
            .await
            .unwrap();
        assert!(!stale.exists());
        assert_eq!(handle.extensions()[0].version, "1.0.0");
        assert!(handle.extensions()[0].entry_point.is_none());
    }

    #[tokio::test]
    async fn prerelease_requires_opt_in() {
        let dir = tempfile::tempdir().unwrap();
        write_package(&dir.path().join("Pkg"), "1.0.0-beta", None);
        let result = LocalExtensionLoader::default()
            .load(
                &SourceSettings::new(dir.path()),
                &manifest(vec![request("Pkg", false)]),
                &mut Diagnostics::new(),
                &CancellationToken::new(),
            )
            .await;
        assert_matches!(result, Err(ExtensionError::Prerelease { version, .. }) if version == "1.0.0-beta");
    }

    #[tokio::test]
    async fn failure_unloads_already_loaded_entry_points() {
        let dir = tempfile::tempdir().unwrap();
        write_package(&dir.path().join("Beta"), "1.0.0", Some("beta"));
        let unloaded = Arc::new(Mutex::new(Vec::new()));
        let loader = LocalExtensionLoader::new(catalog(&unloaded));

        let result = loader
            .load(
                &SourceSettings::new(dir.path()),
                &manifest(vec![request("Beta", false), request("Missing", false)]),
                &mut Diagnostics::new(),
                &CancellationToken::new(),
            )
            .await;
        assert_matches!(result, Err(ExtensionError::PackageNotFound { package, .. }) if package == "Missing");
        assert_eq!(*unloaded.lock(), vec!["beta"]);
    }

    #[tokio::test]
    async fn unknown_entry_point() {
        let dir = tempfile::tempdir().unwrap();
        write_package(&dir.path().join("Pkg"), "1.0.0", Some("nope"));
        let result = LocalExtensionLoader::default()
            .load(
                &SourceSettings::new(dir.path()),
                &manifest(vec![request("Pkg", false)]),
                &mut Diagnostics::new(),
                &CancellationToken::new(),
            )
            .await;
        assert_matches!(result, Err(ExtensionError::UnknownEntryPoint { entry_point, .. }) if entry_point == "nope");
    }

    #[tokio::test]
    async fn cancellation_is_checked_per_package() {
        let dir = tempfile::tempdir().unwrap();
        write_package(&dir.path().join("Pkg"), "1.0.0", None);
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = LocalExtensionLoader::default()
            .load(
                &SourceSettings::new(dir.path()),
                &manifest(vec![request("Pkg", false)]),
                &mut Diagnostics::new(),
                &cancel,
            )
            .await;
        assert_matches!(result, Err(ExtensionError::Cancelled));
    }

    async fn load_in(dir: &Path, requests: Vec<ExtensionRequest>) -> Result<ExtensionHandle> {
        LocalExtensionLoader::default()
            .load(
                &SourceSettings::new(dir),
                &manifest(requests),
                &mut Diagnostics::new(),
                &CancellationToken::new(),
            )
            .await
    }

    #[tokio::test]
    async fn removed_extensions_lose_their_content() {
        let dir = tempfile::tempdir().unwrap();
        let old = dir.path().join(".autostep/extensions/Old/content/old.as");
        std::fs::create_dir_all(old.parent().unwrap()).unwrap();
        std::fs::write(&old, "Feature: Old\n").unwrap();

        let handle = load_in(dir.path(), Vec::new()).await.unwrap();
        assert!(handle.is_empty());
        assert!(!dir.path().join(".autostep/extensions/Old").exists());
        assert!(dir.path().join(".autostep/extensions").is_dir());
    }

    #[tokio::test]
    async fn requested_extensions_keep_their_directory() {
        let dir = tempfile::tempdir().unwrap();
        write_package(&dir.path().join("Pkg"), "1.0.0", None);
        for stale in ["Old/content/old.as", "Pkg/content/old.as"] {
            let path = dir.path().join(".autostep/extensions").join(stale);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, "").unwrap();
        }

        let handle = load_in(dir.path(), vec![request("Pkg", false)]).await.unwrap();
        let root = handle.extensions_root().to_path_buf();
        assert!(!root.join("Old").exists());
        assert!(!root.join("Pkg/content/old.as").exists());
        assert!(root.join("Pkg/content/steps/web.asi").is_file());
    }

    #[tokio::test]
    async fn package_names_cannot_escape_the_extensions_root() {
        let dir = tempfile::tempdir().unwrap();
        write_package(&dir.path().join("docs"), "1.0.0", None);
        let precious = dir.path().join("docs/content/precious.txt");
        std::fs::write(&precious, "keep").unwrap();
        std::fs::create_dir_all(dir.path().join(".autostep/extensions")).unwrap();

        for name in ["../../docs", "docs/", "./docs", "a/b", ""] {
            let err = load_in(dir.path(), vec![request(name, false)]).await.unwrap_err();
            assert_matches!(&err, ExtensionError::InvalidPackageName { package } if package == name);
            assert!(err.is_configuration());
        }
        assert!(precious.is_file());
    }

    #[tokio::test]
    async fn feeds_produce_warnings() {
        let dir = tempfile::tempdir().unwrap();
        write_package(&dir.path().join("Pkg"), "1.0.0", None);
        let project = autostep_config::ProjectConfig {
            extension_sources: vec!["https://feed.example/v3/index.json".into()],
            ..Default::default()
        };
        let sources = SourceSettings::from_project_config(dir.path(), &project);
        let mut diags = Diagnostics::new();
        let handle = LocalExtensionLoader::default()
            .load(
                &sources,
                &manifest(vec![request("Pkg", false)]),
                &mut diags,
                &CancellationToken::new(),
            )
            .await
            .unwrap();
        assert_eq!(handle.extensions().len(), 1);
        assert_eq!(diags.len(), 1);
        assert!(!diags.has_errors());
    }
}
