//! # autostep-config
//!
//! Layered configuration for an AutoStep project.
//!
//! A [`ResolvedConfiguration`] is built from three layers (lowest to highest
//! precedence):
//! 1. **Config file**: `<project>/autostep.config.json`, or an explicit path
//! 2. **Environment variables**: `AUTOSTEP_*` (prefix stripped, `__` nests)
//! 3. **Command line**: `-o key=value` pairs
//!
//! Keys are `:`-separated paths (`web:browser`), matched case-insensitively.
//! Object sections are deep-merged across layers; scalars and arrays are
//! replaced by the higher layer.
//!
//! # Usage
//!
//! ```no_run
//! use autostep_config::{ConfigResolver, ProjectConfig};
//!
//! let config = ConfigResolver::new("/path/to/project")
//!     .overrides(vec![("testFiles".into(), "smoke/**/*.as".into())])
//!     .resolve()?;
//! let project = ProjectConfig::from_resolved(&config)?;
//! println!("test globs: {:?}", project.test_files);
//! # Ok::<(), autostep_config::ConfigError>(())
//! ```

#![deny(unsafe_code)]

pub mod errors;
pub mod merge;
pub mod overrides;
pub mod resolver;
pub mod types;

pub use errors::{ConfigError, OverrideError, Result};
pub use merge::{deep_merge, parse_bool};
pub use overrides::{parse_override, parse_overrides};
pub use resolver::{ConfigLayer, ConfigResolver, LayerSource, ResolvedConfiguration};
pub use types::{ExtensionRequest, ProjectConfig};

/// File name of the project configuration file.
pub const CONFIG_FILE_NAME: &str = "autostep.config.json";

/// Prefix of environment variables contributing to the configuration.
pub const ENV_PREFIX: &str = "AUTOSTEP_";

/// Separator between nested key segments inside environment variable names.
pub const ENV_NESTING_SEPARATOR: &str = "__";

/// Separator between key path segments (`web:browser`).
pub const KEY_SEPARATOR: char = ':';

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn re_exports_work() {
        let _ = ProjectConfig::default();
        let _ = parse_override("a=b");
    }

    #[test]
    fn deep_merge_re_exported() {
        let a = serde_json::json!({"x": 1});
        let b = serde_json::json!({"y": 2});
        let merged = deep_merge(a, b);
        assert_eq!(merged["x"], 1);
        assert_eq!(merged["y"], 2);
    }
}
