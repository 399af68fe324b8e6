//! Package metadata (`extension.json`).

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{ExtensionError, Result};

/// File name of package metadata.
pub const METADATA_FILE_NAME: &str = "extension.json";

/// Directory inside a package whose files are installed into the project.
pub const CONTENT_DIR: &str = "content";

/// Contents of a package's `extension.json`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageMetadata {
    /// Semantic version of the package.
    pub version: String,
    /// Catalog id of the entry point; content-only packages have none.
    #[serde(default)]
    pub entry_point: Option<String>,
}

impl PackageMetadata {
    /// Whether the version carries a pre-release suffix (`1.0.0-beta`).
    ///
    /// Build metadata after `+` is ignored, so `1.0.0+build-5` is a release.
    pub fn is_prerelease(&self) -> bool {
        let core = self.version.split_once('+').map_or(self.version.as_str(), |(core, _)| core);
        core.contains('-')
    }

    /// Read and parse the metadata file at `path`.
    pub async fn read(package: &str, path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ExtensionError::Io {
                package: package.to_owned(),
                path: path.to_path_buf(),
                source,
            })?;
        serde_json::from_str(&content).map_err(|source| ExtensionError::Metadata {
            path: path.to_path_buf(),
            source,
        })
    }
}
