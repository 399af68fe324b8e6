//! Typed views of the well-known project configuration keys.

use serde::{Deserialize, Serialize};

use crate::errors::{ConfigError, Result};
use crate::merge::{get_path, value_as_bool, value_as_list, value_as_string};
use crate::resolver::ResolvedConfiguration;

/// Default glob for interaction files.
pub const DEFAULT_INTERACTION_GLOB: &str = "**/*.asi";

/// Default glob for test files.
pub const DEFAULT_TEST_GLOB: &str = "**/*.as";

/// A requested extension package.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtensionRequest {
    /// Package identifier, e.g. `AutoStep.Web`.
    pub package: String,
    /// Whether pre-release versions may satisfy the request.
    pub prerelease: bool,
}

/// The project-level configuration keys.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectConfig {
    /// Requested extension packages, in load order.
    pub extensions: Vec<ExtensionRequest>,
    /// Additional package sources (local paths or feed URIs).
    pub extension_sources: Vec<String>,
    /// Globs selecting interaction files.
    pub interaction_files: Vec<String>,
    /// Globs selecting test files.
    pub test_files: Vec<String>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            extensions: Vec::new(),
            extension_sources: Vec::new(),
            interaction_files: vec![DEFAULT_INTERACTION_GLOB.to_owned()],
            test_files: vec![DEFAULT_TEST_GLOB.to_owned()],
        }
    }
}

impl ProjectConfig {
    /// Read the project keys from a resolved configuration.
    ///
    /// Missing keys keep their defaults.
    pub fn from_resolved(config: &ResolvedConfiguration) -> Result<Self> {
        let mut project = Self::default();
        if let Some(list) = config.get_string_list("extensionSources")? {
            project.extension_sources = list;
        }
        if let Some(list) = config.get_string_list("interactionFiles")? {
            project.interaction_files = list;
        }
        if let Some(list) = config.get_string_list("testFiles")? {
            project.test_files = list;
        }
        if let Some(value) = config.section("extensions") {
            project.extensions = parse_extensions(&value)?;
        }
        Ok(project)
    }
}

fn parse_extensions(value: &serde_json::Value) -> Result<Vec<ExtensionRequest>> {
    let items = value_as_list(value)
        .ok_or_else(|| ConfigError::invalid("extensions", "expected a list of packages"))?;

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            let key = format!("extensions:{i}");
            // A bare string is shorthand for `{"package": "..."}`.
            if let Some(package) = item.as_str() {
                return Ok(ExtensionRequest {
                    package: package.to_owned(),
                    prerelease: false,
                });
            }
            if !item.is_object() {
                return Err(ConfigError::invalid(key, "expected an object"));
            }
            let package = get_path(item, "package")
                .and_then(value_as_string)
                .filter(|p| !p.trim().is_empty())
                .ok_or_else(|| ConfigError::invalid(&key, "missing package name"))?;
            let prerelease = match get_path(item, "prerelease") {
                None => false,
                Some(v) => value_as_bool(v)
                    .ok_or_else(|| ConfigError::invalid(&key, "prerelease must be a boolean"))?,
            };
            Ok(ExtensionRequest {
                package,
                prerelease,
            })
        })
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
