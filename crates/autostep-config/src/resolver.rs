//! Configuration resolution.
//!
//! Resolution flow:
//! 1. Read the config file (explicit path, or `<project>/autostep.config.json`)
//!    if it exists; a missing file is an empty layer
//! 2. Read `AUTOSTEP_*` environment variables (prefix stripped, `__` nests)
//! 3. Apply command-line `key=value` overrides (highest priority)
//!
//! Layers are kept separate; lookups walk them in precedence order so the
//! result of a key is always traceable to the layer that supplied it.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Json};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

use crate::errors::{ConfigError, Result};
use crate::merge::{deep_merge, get_path, insert_path, value_as_bool, value_as_list, value_as_string};
use crate::{CONFIG_FILE_NAME, ENV_NESTING_SEPARATOR, ENV_PREFIX};

/// Where a configuration layer came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LayerSource {
    /// The JSON configuration file.
    File(PathBuf),
    /// `AUTOSTEP_*` environment variables.
    Environment,
    /// `-o key=value` command-line overrides.
    CommandLine,
}

/// One layer of configuration values.
#[derive(Clone, Debug)]
pub struct ConfigLayer {
    /// Origin of the values.
    pub source: LayerSource,
    /// Values as a JSON object tree.
    pub values: Value,
}

impl ConfigLayer {
    /// Build a command-line layer from `(key, value)` pairs.
    ///
    /// Keys are `:`-separated paths; later pairs win.
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        let mut values = Value::Object(Map::new());
        for (key, value) in pairs {
            insert_path(&mut values, key, Value::String(value.clone()));
        }
        Self {
            source: LayerSource::CommandLine,
            values,
        }
    }

    fn is_empty(&self) -> bool {
        self.values.as_object().is_none_or(Map::is_empty)
    }
}

/// Builder that resolves the layered configuration for one invocation.
#[derive(Clone, Debug)]
pub struct ConfigResolver {
    project_dir: PathBuf,
    config_file: Option<PathBuf>,
    overrides: Vec<(String, String)>,
    env_vars: Option<Vec<(String, String)>>,
}

impl ConfigResolver {
    /// Start resolving configuration for the project in `project_dir`.
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: project_dir.into(),
            config_file: None,
            overrides: Vec::new(),
            env_vars: None,
        }
    }

    /// Use an explicit configuration file instead of the project default.
    #[must_use]
    pub fn config_file(mut self, path: Option<PathBuf>) -> Self {
        self.config_file = path;
        self
    }

    /// Command-line overrides, applied as the highest layer.
    #[must_use]
    pub fn overrides(mut self, pairs: Vec<(String, String)>) -> Self {
        self.overrides = pairs;
        self
    }

    /// Read the environment layer from `vars` instead of the process
    /// environment.
    #[must_use]
    pub fn env_vars<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env_vars = Some(
            vars.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    /// Skip the environment layer.
    #[must_use]
    pub fn without_environment(self) -> Self {
        self.env_vars(std::iter::empty::<(String, String)>())
    }

    /// Path of the configuration file that will be read.
    pub fn config_path(&self) -> PathBuf {
        self.config_file
            .clone()
            .unwrap_or_else(|| default_config_path(&self.project_dir))
    }

    /// Read every layer and produce the immutable configuration.
    pub fn resolve(self) -> Result<ResolvedConfiguration> {
        let config_path = self.config_path();
        let mut layers = Vec::with_capacity(3);

        layers.push(ConfigLayer {
            source: LayerSource::File(config_path.clone()),
            values: read_file_layer(&config_path)?,
        });

        let env_values = match &self.env_vars {
            Some(vars) => env_layer_from_vars(vars),
            None => read_env_layer()?,
        };
        let env = ConfigLayer {
            source: LayerSource::Environment,
            values: env_values,
        };
        if !env.is_empty() {
            debug!("applying {ENV_PREFIX}* environment overrides");
            layers.push(env);
        }

        if !self.overrides.is_empty() {
            debug!(count = self.overrides.len(), "applying command-line overrides");
            layers.push(ConfigLayer::from_pairs(&self.overrides));
        }

        Ok(ResolvedConfiguration {
            config_path,
            layers,
        })
    }
}

/// Default configuration file for a project directory.
pub fn default_config_path(project_dir: &Path) -> PathBuf {
    project_dir.join(CONFIG_FILE_NAME)
}

fn read_file_layer(path: &Path) -> Result<Value> {
    if !path.is_file() {
        debug!(?path, "configuration file not found, using empty file layer");
        return Ok(Value::Object(Map::new()));
    }

    debug!(?path, "loading configuration file");
    Figment::from(Json::file(path))
        .extract::<Value>()
        .map_err(|e| ConfigError::File {
            path: path.to_path_buf(),
            source: Box::new(e),
        })
}

fn read_env_layer() -> Result<Value> {
    Figment::from(Env::prefixed(ENV_PREFIX).split(ENV_NESTING_SEPARATOR))
        .extract::<Value>()
        .map_err(|e| ConfigError::Environment(Box::new(e)))
}

/// Build the environment layer from explicit variables.
///
/// The prefix matches case-insensitively and `__` nests keys, the same way
/// the process-environment provider treats them.
fn env_layer_from_vars(vars: &[(String, String)]) -> Value {
    let mut values = Value::Object(Map::new());
    for (name, value) in vars {
        let Some(prefix) = name.get(..ENV_PREFIX.len()) else {
            continue;
        };
        if !prefix.eq_ignore_ascii_case(ENV_PREFIX) {
            continue;
        }
        let key = name[ENV_PREFIX.len()..]
            .split(ENV_NESTING_SEPARATOR)
            .collect::<Vec<_>>()
            .join(&crate::KEY_SEPARATOR.to_string());
        if key.is_empty() {
            continue;
        }
        insert_path(&mut values, &key, Value::String(value.clone()));
    }
    values
}

/// The resolved, read-only configuration for one command invocation.
#[derive(Clone, Debug)]
pub struct ResolvedConfiguration {
    config_path: PathBuf,
    /// Lowest precedence first.
    layers: Vec<ConfigLayer>,
}

impl ResolvedConfiguration {
    /// Build a configuration from explicit layers (lowest precedence first).
    pub fn from_layers(config_path: impl Into<PathBuf>, layers: Vec<ConfigLayer>) -> Self {
        Self {
            config_path: config_path.into(),
            layers,
        }
    }

    /// Build a configuration with a single file layer holding `values`.
    pub fn from_json(values: Value) -> Self {
        let path = PathBuf::from(CONFIG_FILE_NAME);
        Self::from_layers(
            path.clone(),
            vec![ConfigLayer {
                source: LayerSource::File(path),
                values,
            }],
        )
    }

    /// Path of the configuration file (whether or not it existed).
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// All layers, lowest precedence first.
    pub fn layers(&self) -> &[ConfigLayer] {
        &self.layers
    }

    /// Whether any layer defines `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.layers
            .iter()
            .any(|layer| get_path(&layer.values, key).is_some())
    }

    /// Value at `key` with object sections deep-merged across layers.
    ///
    /// An empty key returns the whole merged tree.
    pub fn section(&self, key: &str) -> Option<Value> {
        self.layers
            .iter()
            .filter_map(|layer| get_path(&layer.values, key))
            .filter(|v| !v.is_null())
            .cloned()
            .reduce(deep_merge)
    }

    /// Scalar value at `key` rendered as a string.
    pub fn get_str(&self, key: &str) -> Option<String> {
        self.section(key).as_ref().and_then(value_as_string)
    }

    /// Boolean value at `key`; boolean-like strings are accepted.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.section(key).as_ref().and_then(value_as_bool)
    }

    /// String list at `key`.
    ///
    /// Non-scalar list items are rejected.
    pub fn get_string_list(&self, key: &str) -> Result<Option<Vec<String>>> {
        let Some(value) = self.section(key) else {
            return Ok(None);
        };
        let items = value_as_list(&value)
            .ok_or_else(|| ConfigError::invalid(key, "expected a list of strings"))?;
        items
            .into_iter()
            .map(|item| {
                value_as_string(item)
                    .ok_or_else(|| ConfigError::invalid(key, "list items must be strings"))
            })
            .collect::<Result<Vec<_>>>()
            .map(Some)
    }

    /// Deserialize the section at `key` into `T`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        self.section(key)
            .map(|value| {
                serde_json::from_value(value).map_err(|e| ConfigError::invalid(key, e.to_string()))
            })
            .transpose()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn write_config(dir: &Path, content: &str) -> PathBuf {
        let path = dir.join(CONFIG_FILE_NAME);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn missing_file_gives_empty_layer() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConfigResolver::new(dir.path())
            .without_environment()
            .resolve()
            .unwrap();
        assert_eq!(config.layers().len(), 1);
        assert_eq!(config.layers()[0].values, json!({}));
        assert_eq!(config.config_path(), dir.path().join(CONFIG_FILE_NAME));
    }

    #[test]
    fn explicit_missing_file_is_not_an_error() {
        let config = ConfigResolver::new("/nonexistent/project")
            .config_file(Some(PathBuf::from("/nonexistent/other.json")))
            .without_environment()
            .resolve()
            .unwrap();
        assert!(config.section("extensions").is_none());
        assert_eq!(config.config_path(), Path::new("/nonexistent/other.json"));
    }

    #[test]
    fn file_values_are_readable() {
        let dir = tempfile::tempdir().unwrap();
        let _ = write_config(
            dir.path(),
            r#"{"testFiles": ["tests/**/*.as"], "web": {"browser": "chrome"}}"#,
        );
        let config = ConfigResolver::new(dir.path())
            .without_environment()
            .resolve()
            .unwrap();
        assert_eq!(
            config.get_string_list("testFiles").unwrap(),
            Some(vec!["tests/**/*.as".to_owned()])
        );
        assert_eq!(config.get_str("WEB:Browser").as_deref(), Some("chrome"));
    }

    #[test]
    fn invalid_json_is_a_file_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), "{ not json");
        let err = ConfigResolver::new(dir.path())
            .without_environment()
            .resolve()
            .unwrap_err();
        assert_matches!(&err, ConfigError::File { path: p, .. } if *p == path);
        assert!(err.to_string().contains(CONFIG_FILE_NAME));
    }

    #[test]
    fn overrides_win_over_file() {
        let dir = tempfile::tempdir().unwrap();
        let _ = write_config(
            dir.path(),
            r#"{"web": {"browser": "chrome", "headless": false}}"#,
        );
        let config = ConfigResolver::new(dir.path())
            .without_environment()
            .overrides(vec![("web:headless".into(), "true".into())])
            .resolve()
            .unwrap();
        assert_eq!(config.get_bool("web:headless"), Some(true));
        // Sibling keys from the lower layer survive the merge.
        assert_eq!(config.get_str("web:browser").as_deref(), Some("chrome"));
        assert_eq!(
            config.section("web"),
            Some(json!({"browser": "chrome", "headless": "true"}))
        );
    }

    #[test]
    fn get_deserializes_sections() {
        #[derive(serde::Deserialize)]
        struct Web {
            browser: String,
        }
        let config = ResolvedConfiguration::from_json(json!({"web": {"browser": "edge"}}));
        let web: Web = config.get("web").unwrap().unwrap();
        assert_eq!(web.browser, "edge");
        assert!(config.get::<Web>("missing").unwrap().is_none());
        assert!(config.get::<u32>("web").is_err());
    }

    #[test]
    fn string_list_rejects_objects() {
        let config = ResolvedConfiguration::from_json(json!({"testFiles": {"a": 1}}));
        assert_matches!(
            config.get_string_list("testFiles"),
            Err(ConfigError::InvalidValue { .. })
        );
    }

    #[test]
    fn contains_checks_every_layer() {
        let config = ResolvedConfiguration::from_layers(
            CONFIG_FILE_NAME,
            vec![
                ConfigLayer {
                    source: LayerSource::File(CONFIG_FILE_NAME.into()),
                    values: json!({}),
                },
                ConfigLayer::from_pairs(&[("flag".into(), "true".into())]),
            ],
        );
        assert!(config.contains("FLAG"));
        assert!(!config.contains("other"));
    }

    #[test]
    fn injected_environment_variables() {
        let config = ConfigResolver::new("/nonexistent/project")
            .env_vars([
                ("autostep_Web__Browser", "firefox"),
                ("AUTOSTEP_TESTFILES__0", "smoke/*.as"),
                ("OTHER_VALUE", "ignored"),
                ("AUTOSTEP_", "ignored"),
            ])
            .resolve()
            .unwrap();
        assert_eq!(config.layers()[1].source, LayerSource::Environment);
        assert_eq!(config.get_str("web:browser").as_deref(), Some("firefox"));
        assert_eq!(
            config.get_string_list("testFiles").unwrap(),
            Some(vec!["smoke/*.as".to_owned()])
        );
        assert!(!config.contains("other_value"));
    }

    #[test]
    fn environment_layer_sits_between_file_and_overrides() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                CONFIG_FILE_NAME,
                r#"{"jailPrecedence": {"fromFile": "file", "shared": "file", "top": "file"}}"#,
            )?;
            jail.set_env("AUTOSTEP_JAILPRECEDENCE__SHARED", "env");
            jail.set_env("AUTOSTEP_JAILPRECEDENCE__TOP", "env");

            let config = ConfigResolver::new(jail.directory())
                .overrides(vec![("jailPrecedence:top".into(), "cli".into())])
                .resolve()
                .map_err(|e| e.to_string())?;

            assert_eq!(config.layers().len(), 3);
            assert_eq!(config.layers()[1].source, LayerSource::Environment);
            assert_eq!(config.get_str("jailPrecedence:fromFile").as_deref(), Some("file"));
            assert_eq!(config.get_str("jailPrecedence:shared").as_deref(), Some("env"));
            assert_eq!(config.get_str("jailPrecedence:top").as_deref(), Some("cli"));
            Ok(())
        });
    }
}
