//! Glob-selected sets of project files.
//!
//! A [`FileSet`] is built by walking a root directory and keeping every file
//! whose path (relative to the root, `/`-separated) matches at least one
//! include glob and no exclude glob. `*` stays within one path segment and
//! `**` spans any number of segments.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use tracing::{debug, trace};
use walkdir::WalkDir;

use crate::errors::FileSetError;

/// A deduplicated, sorted set of absolute file paths.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct FileSet {
    files: BTreeSet<PathBuf>,
}

impl FileSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan `root` for files matching `include` and not matching `exclude`.
    ///
    /// A root that does not exist yields an empty set.
    pub fn create<I, E>(root: &Path, include: I, exclude: E) -> Result<Self, FileSetError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
        E: IntoIterator,
        E::Item: AsRef<str>,
    {
        let include = build_globset(include)?;
        let exclude = build_globset(exclude)?;

        if !root.is_dir() {
            debug!(root = %root.display(), "file set root missing, returning empty set");
            return Ok(Self::new());
        }

        let mut files = BTreeSet::new();
        for entry in WalkDir::new(root).follow_links(true) {
            let entry = entry.map_err(|source| FileSetError::Walk {
                root: root.to_path_buf(),
                source,
            })?;
            if !entry.file_type().is_file() {
                continue;
            }

            let Ok(relative) = entry.path().strip_prefix(root) else {
                continue;
            };
            let candidate = to_glob_path(relative);
            if include.is_match(&candidate) && !exclude.is_match(&candidate) {
                trace!(file = %candidate, "file set match");
                let _ = files.insert(absolute(entry.path()));
            }
        }

        debug!(root = %root.display(), count = files.len(), "file set created");
        Ok(Self { files })
    }

    /// Union of two sets.
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            files: self.files.union(&other.files).cloned().collect(),
        }
    }

    /// Add every file of `other` to this set.
    pub fn extend_from(&mut self, other: &Self) {
        self.files.extend(other.files.iter().cloned());
    }

    /// Whether the set contains `path`.
    pub fn contains(&self, path: &Path) -> bool {
        self.files.contains(path)
    }

    /// Number of files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Iterate in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.files.iter().map(PathBuf::as_path)
    }
}

impl FromIterator<PathBuf> for FileSet {
    fn from_iter<T: IntoIterator<Item = PathBuf>>(iter: T) -> Self {
        Self {
            files: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a FileSet {
    type Item = &'a PathBuf;
    type IntoIter = std::collections::btree_set::Iter<'a, PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}

fn build_globset<I>(patterns: I) -> Result<GlobSet, FileSetError>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let pattern = pattern.as_ref();
        let glob = GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .map_err(|source| FileSetError::Pattern {
                pattern: pattern.to_owned(),
                source,
            })?;
        let _ = builder.add(glob);
    }
    builder.build().map_err(|source| FileSetError::Pattern {
        pattern: String::new(),
        source,
    })
}

fn to_glob_path(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
