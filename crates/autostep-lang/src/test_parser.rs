//! Parser for test (`.as`) files.
//!
//! Line-oriented: every non-blank, non-comment line is a tag line, a
//! `Feature:` or `Scenario:` header, a step, or description text.
//! Problems are reported as diagnostics and parsing continues with the
//! next line, so one pass reports every error in the file.

use std::path::Path;

use autostep_core::{Diagnostic, Diagnostics, SourceLocation};

use crate::ast::{Feature, Scenario, Step, StepKeyword, TestFile};

/// Parse a test file, appending problems to `diagnostics`.
pub fn parse_test_file(path: &Path, source: &str, diagnostics: &mut Diagnostics) -> TestFile {
    let mut parser = Parser {
        path,
        diagnostics,
        feature: None,
        pending_tags: Vec::new(),
    };

    for (index, raw) in source.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let column = raw.len() - raw.trim_start().len() + 1;
        let location = SourceLocation::new(path, index + 1, column);
        parser.line(line, location);
    }

    let feature = parser.finish();
    if feature.is_none() {
        diagnostics.push(Diagnostic::warning("test file contains no Feature").at(path, 1, 1));
    }

    TestFile {
        path: path.to_path_buf(),
        feature,
    }
}

struct Parser<'a> {
    path: &'a Path,
    diagnostics: &'a mut Diagnostics,
    feature: Option<Feature>,
    pending_tags: Vec<String>,
}

impl Parser<'_> {
    fn line(&mut self, line: &str, location: SourceLocation) {
        if line.starts_with('@') {
            self.pending_tags.extend(
                line.split_whitespace()
                    .map(|t| t.trim_start_matches('@').to_owned())
                    .filter(|t| !t.is_empty()),
            );
        } else if let Some(name) = header(line, "Feature") {
            self.feature_header(name, location);
        } else if let Some(name) = header(line, "Scenario") {
            self.scenario_header(name, location);
        } else if let Some((keyword, text)) = step_line(line) {
            self.step(keyword, text, location);
        } else {
            self.text(line, location);
        }
    }

    fn error(&mut self, message: impl Into<String>, location: SourceLocation) {
        self.diagnostics
            .push(Diagnostic::error(message).with_location(location));
    }

    fn feature_header(&mut self, name: &str, location: SourceLocation) {
        let tags = std::mem::take(&mut self.pending_tags);
        if self.feature.is_some() {
            self.error("a test file may only contain one Feature", location);
            return;
        }
        if name.is_empty() {
            self.error("Feature has no name", location.clone());
        }
        self.feature = Some(Feature {
            name: name.to_owned(),
            tags,
            description: Vec::new(),
            location,
            scenarios: Vec::new(),
        });
    }

    fn scenario_header(&mut self, name: &str, location: SourceLocation) {
        let tags = std::mem::take(&mut self.pending_tags);
        if name.is_empty() {
            self.error("Scenario has no name", location.clone());
        }
        let Some(feature) = self.feature.as_mut() else {
            self.error("Scenario must be inside a Feature", location);
            return;
        };
        feature.scenarios.push(Scenario {
            name: name.to_owned(),
            tags,
            description: Vec::new(),
            location,
            steps: Vec::new(),
        });
    }

    fn step(&mut self, keyword: StepKeyword, text: &str, location: SourceLocation) {
        let Some(scenario) = self
            .feature
            .as_mut()
            .and_then(|f| f.scenarios.last_mut())
        else {
            self.error(format!("'{keyword}' step is outside a Scenario"), location);
            return;
        };

        let previous = scenario.steps.last().map(|s| s.kind);
        let Some(kind) = keyword.kind().or(previous) else {
            self.error(
                format!("'{keyword}' must follow another step in the Scenario"),
                location,
            );
            return;
        };

        if text.is_empty() {
            self.error(format!("'{keyword}' step has no text"), location);
            return;
        }

        scenario.steps.push(Step {
            keyword,
            kind,
            text: text.to_owned(),
            location,
        });
    }

    fn text(&mut self, line: &str, location: SourceLocation) {
        let message = match self.feature.as_mut() {
            None => format!("unexpected text before Feature: '{line}'"),
            Some(feature) => match feature.scenarios.last_mut() {
                Some(scenario) if !scenario.steps.is_empty() => {
                    format!("unexpected text after step: '{line}'")
                }
                Some(scenario) => {
                    scenario.description.push(line.to_owned());
                    return;
                }
                None => {
                    feature.description.push(line.to_owned());
                    return;
                }
            },
        };
        self.error(message, location);
    }

    fn finish(&mut self) -> Option<Feature> {
        if !self.pending_tags.is_empty() {
            self.diagnostics.push(
                Diagnostic::warning("tags at end of file are not applied to anything")
                    .at(self.path, 1, 1),
            );
        }
        self.feature.take()
    }
}

/// `Keyword: rest` with a case-insensitive keyword.
fn header<'l>(line: &'l str, keyword: &str) -> Option<&'l str> {
    let (head, rest) = line.split_once(':')?;
    head.trim()
        .eq_ignore_ascii_case(keyword)
        .then(|| rest.trim())
}

fn step_line(line: &str) -> Option<(StepKeyword, &str)> {
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    StepKeyword::parse(word).map(|keyword| (keyword, rest))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use autostep_core::StepKind;

    fn parse(source: &str) -> (TestFile, Diagnostics) {
        let mut diagnostics = Diagnostics::new();
        let file = parse_test_file(Path::new("login.as"), source, &mut diagnostics);
        (file, diagnostics)
    }

    fn messages(diagnostics: &Diagnostics) -> Vec<String> {
        diagnostics.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn parses_a_complete_file() {
        let (file, diags) = parse(
            "# login tests
@smoke @web
Feature: Login
  Users sign in with a password.

  @happy
  Scenario: Valid credentials
    Given I am on the login page
    When I enter \"alice\" as the user
    And I press login
    Then I see the dashboard
    But I do not see an error
",
        );
        assert!(diags.is_empty(), "{:?}", messages(&diags));
        let feature = file.feature.unwrap();
        assert_eq!(feature.name, "Login");
        assert_eq!(feature.tags, vec!["smoke", "web"]);
        assert_eq!(feature.description, vec!["Users sign in with a password."]);

        let scenario = &feature.scenarios[0];
        assert_eq!(scenario.tags, vec!["happy"]);
        let kinds: Vec<_> = scenario.steps.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                StepKind::Given,
                StepKind::When,
                StepKind::When,
                StepKind::Then,
                StepKind::Then
            ]
        );
        assert_eq!(scenario.steps[2].keyword, StepKeyword::And);
        assert_eq!(scenario.steps[0].location, SourceLocation::new("login.as", 8, 5));
    }

    #[test]
    fn second_feature_is_an_error() {
        let (_, diags) = parse("Feature: A\nFeature: B\n");
        insta::assert_snapshot!(messages(&diags).join("\n"), @"login.as(2,1): error: a test file may only contain one Feature");
    }

    #[test]
    fn structural_errors() {
        let (_, diags) = parse(
            "Scenario: Early
Feature:
  Given loose step
  Scenario:
    And first
    Given a step
    trailing text
",
        );
        insta::assert_snapshot!(messages(&diags).join("\n"), @r"
        login.as(1,1): error: Scenario must be inside a Feature
        login.as(2,1): error: Feature has no name
        login.as(3,3): error: 'Given' step is outside a Scenario
        login.as(4,3): error: Scenario has no name
        login.as(5,5): error: 'And' must follow another step in the Scenario
        login.as(7,5): error: unexpected text after step: 'trailing text'
        ");
    }

    #[test]
    fn missing_feature_is_a_warning() {
        let (file, diags) = parse("# nothing here\n");
        assert!(file.feature.is_none());
        assert!(!diags.has_errors());
        assert_eq!(messages(&diags), vec!["login.as(1,1): warning: test file contains no Feature"]);
    }

    #[test]
    fn step_without_text_is_an_error() {
        let (_, diags) = parse("Feature: F\nScenario: S\nGiven\n");
        assert_eq!(messages(&diags), vec!["login.as(3,1): error: 'Given' step has no text"]);
    }

    #[test]
    fn keywords_are_case_insensitive() {
        let (file, diags) = parse("feature: F\n  scenario: S\n    given x\n");
        assert!(diags.is_empty());
        assert_eq!(file.feature.unwrap().scenarios[0].steps.len(), 1);
    }
}
