//! Step definitions and pattern matching.
//!
//! A pattern is a sequence of whitespace-separated tokens. Literal tokens
//! match case-insensitively; a `{name}` token captures one word or one
//! quoted string of the step text.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::diagnostics::SourceLocation;
use crate::errors::{PatternError, StepFailure};

/// The kind of a step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StepKind {
    /// Preconditions.
    Given,
    /// Actions.
    When,
    /// Assertions.
    Then,
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Given => "Given",
            Self::When => "When",
            Self::Then => "Then",
        })
    }
}

impl FromStr for StepKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "given" => Ok(Self::Given),
            "when" => Ok(Self::When),
            "then" => Ok(Self::Then),
            _ => Err(()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum PatternToken {
    Literal(String),
    Placeholder(String),
}

/// A parsed step pattern such as `I click {button}`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StepPattern {
    text: String,
    tokens: Vec<PatternToken>,
}

impl StepPattern {
    /// Parse pattern text.
    pub fn parse(text: &str) -> Result<Self, PatternError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(PatternError::Empty);
        }

        let mut depth = 0usize;
        for c in text.chars() {
            match c {
                '{' if depth == 0 => depth = 1,
                '}' if depth == 1 => depth = 0,
                '{' | '}' => return Err(PatternError::Unbalanced(text.to_owned())),
                _ => {}
            }
        }
        if depth != 0 {
            return Err(PatternError::Unbalanced(text.to_owned()));
        }

        let tokens = text
            .split_whitespace()
            .map(|word| {
                if !word.contains(['{', '}']) {
                    return Ok(PatternToken::Literal(word.to_owned()));
                }
                word.strip_prefix('{')
                    .and_then(|w| w.strip_suffix('}'))
                    .filter(|name| !name.is_empty() && !name.contains(['{', '}']))
                    .map(|name| PatternToken::Placeholder(name.to_owned()))
                    .ok_or_else(|| PatternError::InvalidPlaceholder(word.to_owned()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            text: text.to_owned(),
            tokens,
        })
    }

    /// The pattern as written.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Names of the placeholders, in order.
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().filter_map(|t| match t {
            PatternToken::Placeholder(name) => Some(name.as_str()),
            PatternToken::Literal(_) => None,
        })
    }

    /// Match step text, returning the captured arguments on success.
    pub fn matches(&self, step_text: &str) -> Option<StepArguments> {
        let words = tokenize(step_text);
        if words.len() != self.tokens.len() {
            return None;
        }

        let mut arguments = StepArguments::default();
        for (token, word) in self.tokens.iter().zip(words) {
            match token {
                PatternToken::Literal(literal) => {
                    if word.quoted || !literal.eq_ignore_ascii_case(&word.text) {
                        return None;
                    }
                }
                PatternToken::Placeholder(name) => arguments.push(name.clone(), word.text),
            }
        }
        Some(arguments)
    }
}

impl fmt::Display for StepPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

struct Word {
    text: String,
    quoted: bool,
}

fn tokenize(text: &str) -> Vec<Word> {
    let mut words = Vec::new();
    let mut chars = text.trim().chars().peekable();
    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            let _ = chars.next();
            continue;
        }
        if c == '"' || c == '\'' {
            let _ = chars.next();
            let text: String = chars.by_ref().take_while(|&ch| ch != c).collect();
            words.push(Word { text, quoted: true });
            continue;
        }
        let mut text = String::new();
        while let Some(&ch) = chars.peek() {
            if ch.is_whitespace() {
                break;
            }
            text.push(ch);
            let _ = chars.next();
        }
        words.push(Word {
            text,
            quoted: false,
        });
    }
    words
}

/// Arguments captured while matching a step.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepArguments(Vec<(String, String)>);

impl StepArguments {
    /// Append a captured argument.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push((name.into(), value.into()));
    }

    /// Value of the named argument.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Iterate `(name, value)` pairs in capture order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Number of arguments.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether nothing was captured.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Executable implementation of a step.
#[async_trait]
pub trait StepHandler: Send + Sync {
    /// Run the step with its captured arguments.
    async fn invoke(&self, arguments: &StepArguments) -> Result<(), StepFailure>;
}

/// Where a step definition came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StepSource {
    /// Declared in an interaction file.
    Interaction {
        /// Position of the `Step:` line.
        location: SourceLocation,
        /// Indented body lines following the declaration.
        body: Vec<String>,
    },
    /// Registered by an extension.
    Extension {
        /// Name of the registering entry point.
        name: String,
    },
}

impl fmt::Display for StepSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interaction { location, .. } => write!(f, "{location}"),
            Self::Extension { name } => write!(f, "extension '{name}'"),
        }
    }
}

/// A bindable step.
#[derive(Clone)]
pub struct StepDefinition {
    /// Kind the definition binds to.
    pub kind: StepKind,
    /// Text pattern.
    pub pattern: StepPattern,
    /// Origin of the definition.
    pub source: StepSource,
    /// Implementation, when the definition carries one.
    pub handler: Option<Arc<dyn StepHandler>>,
}

impl StepDefinition {
    /// A definition declared in an interaction file.
    pub fn interaction(
        kind: StepKind,
        pattern: StepPattern,
        location: SourceLocation,
        body: Vec<String>,
    ) -> Self {
        Self {
            kind,
            pattern,
            source: StepSource::Interaction { location, body },
            handler: None,
        }
    }

    /// A definition registered by an extension.
    pub fn extension(
        name: impl Into<String>,
        kind: StepKind,
        pattern: StepPattern,
        handler: Arc<dyn StepHandler>,
    ) -> Self {
        Self {
            kind,
            pattern,
            source: StepSource::Extension { name: name.into() },
            handler: Some(handler),
        }
    }

    /// Match a step of `kind` with `text`.
    pub fn bind(&self, kind: StepKind, text: &str) -> Option<StepArguments> {
        if self.kind != kind {
            return None;
        }
        self.pattern.matches(text)
    }
}

impl fmt::Debug for StepDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepDefinition")
            .field("kind", &self.kind)
            .field("pattern", &self.pattern.text())
            .field("source", &self.source)
            .field("has_handler", &self.handler.is_some())
            .finish()
    }
}

impl fmt::Display for StepDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.kind, self.pattern, self.source)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    struct Noop;

    #[async_trait]
    impl StepHandler for Noop {
        async fn invoke(&self, _arguments: &StepArguments) -> Result<(), StepFailure> {
            Ok(())
        }
    }

    // ── parsing ─────────────────────────────────────────────────────

    #[test]
    fn parses_literals_and_placeholders() {
        let pattern = StepPattern::parse("I click the {button} button").unwrap();
        assert_eq!(pattern.placeholders().collect::<Vec<_>>(), vec!["button"]);
        assert_eq!(pattern.text(), "I click the {button} button");
    }

    #[test]
    fn rejects_empty_pattern() {
        assert_eq!(StepPattern::parse("   "), Err(PatternError::Empty));
    }

    #[test]
    fn rejects_unbalanced_braces() {
        assert_matches!(StepPattern::parse("I have {count"), Err(PatternError::Unbalanced(_)));
        assert_matches!(StepPattern::parse("I have count}"), Err(PatternError::Unbalanced(_)));
        assert_matches!(StepPattern::parse("I {{nested}}"), Err(PatternError::Unbalanced(_)));
    }

    #[test]
    fn rejects_embedded_placeholders() {
        assert_matches!(StepPattern::parse("I have {n}s"), Err(PatternError::InvalidPlaceholder(w)) if w == "{n}s");
        assert_matches!(StepPattern::parse("I have {}"), Err(PatternError::InvalidPlaceholder(_)));
    }

    // ── matching ────────────────────────────────────────────────────

    #[test]
    fn literals_match_case_insensitively() {
        let pattern = StepPattern::parse("I am on the home page").unwrap();
        assert!(pattern.matches("i AM on the Home page").is_some());
        assert!(pattern.matches("I am on the login page").is_none());
        assert!(pattern.matches("I am on the home").is_none());
    }

    #[test]
    fn placeholders_capture_words_and_quoted_strings() {
        let pattern = StepPattern::parse("I enter {text} into {field}").unwrap();
        let args = pattern.matches("I enter \"hello world\" into username").unwrap();
        assert_eq!(args.get("text"), Some("hello world"));
        assert_eq!(args.get("field"), Some("username"));
        assert_eq!(args.len(), 2);
    }

    #[test]
    fn quoted_text_does_not_match_literals() {
        let pattern = StepPattern::parse("I press enter").unwrap();
        assert!(pattern.matches("I press 'enter'").is_none());
    }

    #[test]
    fn bind_checks_kind() {
        let def = StepDefinition::extension(
            "web",
            StepKind::Given,
            StepPattern::parse("a browser").unwrap(),
            Arc::new(Noop),
        );
        assert!(def.bind(StepKind::Given, "a browser").is_some());
        assert!(def.bind(StepKind::When, "a browser").is_none());
        assert_eq!(def.to_string(), "Given a browser (extension 'web')");
    }

    #[test]
    fn kind_parses_case_insensitively() {
        assert_eq!("THEN".parse::<StepKind>(), Ok(StepKind::Then));
        assert!("And".parse::<StepKind>().is_err());
    }

    #[tokio::test]
    async fn handler_invocation() {
        let def = StepDefinition::extension(
            "x",
            StepKind::When,
            StepPattern::parse("it runs").unwrap(),
            Arc::new(Noop),
        );
        let handler = def.handler.unwrap();
        assert!(handler.invoke(&StepArguments::default()).await.is_ok());
    }
}
