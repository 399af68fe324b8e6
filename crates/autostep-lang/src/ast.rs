//! Syntax tree of a test file.

use std::fmt;
use std::path::PathBuf;

use autostep_core::{SourceLocation, StepKind};

/// Keyword that starts a step line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepKeyword {
    /// `Given`
    Given,
    /// `When`
    When,
    /// `Then`
    Then,
    /// `And`, continuing the previous step's kind.
    And,
    /// `But`, continuing the previous step's kind.
    But,
}

impl StepKeyword {
    /// Recognise a keyword (case-insensitive).
    pub fn parse(word: &str) -> Option<Self> {
        match word.to_ascii_lowercase().as_str() {
            "given" => Some(Self::Given),
            "when" => Some(Self::When),
            "then" => Some(Self::Then),
            "and" => Some(Self::And),
            "but" => Some(Self::But),
            _ => None,
        }
    }

    /// The step kind this keyword names directly, `None` for `And`/`But`.
    pub fn kind(self) -> Option<StepKind> {
        match self {
            Self::Given => Some(StepKind::Given),
            Self::When => Some(StepKind::When),
            Self::Then => Some(StepKind::Then),
            Self::And | Self::But => None,
        }
    }
}

impl fmt::Display for StepKeyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Given => "Given",
            Self::When => "When",
            Self::Then => "Then",
            Self::And => "And",
            Self::But => "But",
        })
    }
}

/// One step line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Step {
    /// Keyword as written.
    pub keyword: StepKeyword,
    /// Kind after `And`/`But` inheritance.
    pub kind: StepKind,
    /// Text after the keyword.
    pub text: String,
    /// Position of the keyword.
    pub location: SourceLocation,
}

/// A scenario block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scenario {
    /// Name after `Scenario:`.
    pub name: String,
    /// Tags on the lines above.
    pub tags: Vec<String>,
    /// Free text between the header and the first step.
    pub description: Vec<String>,
    /// Position of the header.
    pub location: SourceLocation,
    /// Steps in order.
    pub steps: Vec<Step>,
}

/// A feature block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Feature {
    /// Name after `Feature:`.
    pub name: String,
    /// Tags on the lines above.
    pub tags: Vec<String>,
    /// Free text between the header and the first scenario.
    pub description: Vec<String>,
    /// Position of the header.
    pub location: SourceLocation,
    /// Scenarios in order.
    pub scenarios: Vec<Scenario>,
}

/// A parsed test file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TestFile {
    /// Where the file lives.
    pub path: PathBuf,
    /// The file's feature, if it declared one.
    pub feature: Option<Feature>,
}
