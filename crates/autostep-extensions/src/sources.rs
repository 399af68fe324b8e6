//! Where packages come from and which packages to load.

use std::path::{Path, PathBuf};

use autostep_config::{ExtensionRequest, ProjectConfig, ResolvedConfiguration};

use crate::errors::Result;

/// Directory, relative to the project, that holds AutoStep state.
pub const STATE_DIR: &str = ".autostep";

/// Installed extensions live in `<project>/.autostep/extensions`.
pub fn extensions_root(project_dir: &Path) -> PathBuf {
    project_dir.join(STATE_DIR).join("extensions")
}

/// A place to look for packages.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PackageSource {
    /// A local directory.
    Local(PathBuf),
    /// A remote package feed URI.
    Feed(String),
}

impl PackageSource {
    /// Interpret a configured source entry.
    ///
    /// `http://` and `https://` entries are feeds; anything else is a path,
    /// resolved against `project_dir` when relative.
    pub fn parse(entry: &str, project_dir: &Path) -> Self {
        let lower = entry.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Self::Feed(entry.to_owned())
        } else {
            Self::Local(project_dir.join(entry))
        }
    }
}

/// Package sources for one project.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceSettings {
    project_dir: PathBuf,
    sources: Vec<PackageSource>,
}

impl SourceSettings {
    /// Sources with only the project directory.
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        let project_dir = project_dir.into();
        Self {
            sources: vec![PackageSource::Local(project_dir.clone())],
            project_dir,
        }
    }

    /// The project directory followed by every configured `extensionSources`
    /// entry.
    pub fn from_config(project_dir: impl Into<PathBuf>, config: &ResolvedConfiguration) -> Result<Self> {
        let project = ProjectConfig::from_resolved(config)?;
        Ok(Self::from_project_config(project_dir, &project))
    }

    /// As [`from_config`](Self::from_config), from already-typed settings.
    pub fn from_project_config(project_dir: impl Into<PathBuf>, project: &ProjectConfig) -> Self {
        let mut settings = Self::new(project_dir);
        for entry in &project.extension_sources {
            let source = PackageSource::parse(entry, &settings.project_dir);
            settings.sources.push(source);
        }
        settings
    }

    /// The project directory.
    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    /// Where installed extensions live.
    pub fn extensions_root(&self) -> PathBuf {
        extensions_root(&self.project_dir)
    }

    /// All sources in search order.
    pub fn sources(&self) -> &[PackageSource] {
        &self.sources
    }

    /// Local directories in search order.
    pub fn local_dirs(&self) -> impl Iterator<Item = &Path> {
        self.sources.iter().filter_map(|s| match s {
            PackageSource::Local(dir) => Some(dir.as_path()),
            PackageSource::Feed(_) => None,
        })
    }

    /// Remote feeds.
    pub fn feeds(&self) -> impl Iterator<Item = &str> {
        self.sources.iter().filter_map(|s| match s {
            PackageSource::Feed(uri) => Some(uri.as_str()),
            PackageSource::Local(_) => None,
        })
    }
}

/// The packages a project asks for, in load order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExtensionManifest {
    /// Requested packages.
    pub extensions: Vec<ExtensionRequest>,
}

impl ExtensionManifest {
    /// Read the `extensions` list from configuration.
    pub fn from_config(config: &ResolvedConfiguration) -> Result<Self> {
        let project = ProjectConfig::from_resolved(config)?;
        Ok(Self {
            extensions: project.extensions,
        })
    }

    /// Whether no packages are requested.
    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
