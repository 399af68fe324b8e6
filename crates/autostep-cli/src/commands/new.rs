//! `autostep new project|web`

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use autostep_config::CONFIG_FILE_NAME;
use autostep_core::{INTERACTION_FILE_EXTENSION, TEST_FILE_EXTENSION};
use serde_json::{Value, json};
use tracing::info;

use crate::args::Template;
use crate::errors::CommandError;

/// Package requested by the web template.
pub const WEB_PACKAGE: &str = "AutoStep.Web";

/// Package feed added to the web template's sources.
pub const WEB_PACKAGE_FEED: &str = "https://api.nuget.org/v3/index.json";

/// Write the template into its directory.
pub fn execute(template: &Template) -> Result<bool, CommandError> {
    let directory = template
        .args()
        .directory
        .clone()
        .unwrap_or_else(|| PathBuf::from("."));
    let written = scaffold(template, &directory).map_err(CommandError::Scaffold)?;
    for file in &written {
        info!(file = %file.display(), "created");
    }
    info!("Project created in {}", directory.display());
    Ok(true)
}

/// Create `directory` if needed and write the template's files into it.
///
/// Refuses to touch a directory that already holds a configuration file.
pub fn scaffold(template: &Template, directory: &Path) -> anyhow::Result<Vec<PathBuf>> {
    fs::create_dir_all(directory)
        .with_context(|| format!("failed to create directory '{}'", directory.display()))?;
    let directory = std::path::absolute(directory)
        .with_context(|| format!("failed to resolve '{}'", directory.display()))?;

    let config_path = directory.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        bail!("'{}' already exists", config_path.display());
    }

    let name = project_name(&directory);
    let mut files = vec![(config_path, config_for(template))];
    match template {
        Template::Project(_) => {
            files.push((
                directory.join(format!("{name}.{TEST_FILE_EXTENSION}")),
                project_test_file(&name),
            ));
        }
        Template::Web(_) => {
            files.push((
                directory.join(format!("{name}.{TEST_FILE_EXTENSION}")),
                web_test_file(&name),
            ));
            files.push((
                directory.join(format!("{name}.{INTERACTION_FILE_EXTENSION}")),
                web_interaction_file(&name),
            ));
        }
    }

    let mut written = Vec::with_capacity(files.len());
    for (path, content) in files {
        fs::write(&path, content)
            .with_context(|| format!("failed to write '{}'", path.display()))?;
        written.push(path);
    }
    Ok(written)
}

fn project_name(directory: &Path) -> String {
    directory
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "project".to_owned())
}

fn config_for(template: &Template) -> String {
    let config: Value = match template {
        Template::Project(_) => json!({
            "extensions": [],
            "extensionSources": [],
        }),
        Template::Web(_) => json!({
            "extensions": [{ "package": WEB_PACKAGE, "prerelease": true }],
            "extensionSources": [WEB_PACKAGE_FEED],
        }),
    };
    let mut text = serde_json::to_string_pretty(&config).unwrap_or_default();
    text.push('\n');
    text
}

fn project_test_file(name: &str) -> String {
    format!(
        "# Tests for {name}.\n\
         Feature: {name}\n\
         \n\
         \x20 Scenario: First scenario\n"
    )
}

fn web_test_file(name: &str) -> String {
    format!(
        "@web\n\
         Feature: {name}\n\
         \n\
         \x20 Scenario: Home page loads\n\
         \x20   Given the \"home\" page is open\n"
    )
}

fn web_interaction_file(name: &str) -> String {
    format!(
        "# Interactions for {name}.\n\
         Step: Given the {{page}} page is open\n\
         \x20 navigate to {{page}}\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::NewArgs;
    use autostep_config::ConfigResolver;
    use autostep_core::Diagnostics;
    use autostep_lang::{link, parse_interaction_file, parse_test_file};
    use std::sync::Arc;

    fn project() -> Template {
        Template::Project(NewArgs { directory: None })
    }

    fn web() -> Template {
        Template::Web(NewArgs { directory: None })
    }

    #[test]
    fn project_template() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("demo");
        let written = scaffold(&project(), &target).unwrap();
        assert_eq!(written.len(), 2);

        let config = ConfigResolver::new(&target).without_environment().resolve().unwrap();
        assert_eq!(config.get_string_list("extensions").unwrap(), Some(Vec::new()));
        let test = fs::read_to_string(target.join("demo.as")).unwrap();
        assert!(test.contains("Feature: demo"));
    }

    #[test]
    fn web_template_links() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("site");
        let _ = scaffold(&web(), &target).unwrap();

        let config = ConfigResolver::new(&target).without_environment().resolve().unwrap();
        assert_eq!(config.get_str("extensions:0:package").as_deref(), Some(WEB_PACKAGE));
        assert_eq!(config.get_bool("extensions:0:prerelease"), Some(true));

        let mut diagnostics = Diagnostics::new();
        let asi = target.join("site.asi");
        let definitions = parse_interaction_file(
            &asi,
            &fs::read_to_string(&asi).unwrap(),
            &mut diagnostics,
        );
        let test_path = target.join("site.as");
        let test = parse_test_file(
            &test_path,
            &fs::read_to_string(&test_path).unwrap(),
            &mut diagnostics,
        );
        assert!(diagnostics.is_empty());

        let definitions: Vec<_> = definitions.into_iter().map(Arc::new).collect();
        let outcome = link(&[test], &definitions);
        assert!(!outcome.diagnostics.has_errors());
        assert_eq!(outcome.plan.unwrap().step_count(), 1);
    }

    #[test]
    fn refuses_existing_config() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE_NAME), "{}").unwrap();
        let err = scaffold(&project(), dir.path()).unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }
}
