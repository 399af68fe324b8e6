//! Parser for interaction (`.asi`) files.
//!
//! ```text
//! # comment
//! Step: Given I am on the {page} page
//!   navigate to {page}
//! ```
//!
//! Each `Step:` line declares a definition; the indented lines after it are
//! its body.

use std::path::Path;

use autostep_core::{Diagnostic, Diagnostics, SourceLocation, StepDefinition, StepKind, StepPattern};

const STEP_HEADER: &str = "Step:";

struct Pending {
    kind: StepKind,
    pattern: StepPattern,
    location: SourceLocation,
    body: Vec<String>,
}

/// Parse an interaction file into step definitions, appending problems to
/// `diagnostics`.
pub fn parse_interaction_file(
    path: &Path,
    source: &str,
    diagnostics: &mut Diagnostics,
) -> Vec<StepDefinition> {
    let mut definitions = Vec::new();
    let mut current: Option<Pending> = None;
    // Body lines of a rejected declaration are skipped rather than reported.
    let mut in_rejected_body = false;

    for (index, raw) in source.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let indent = raw.len() - raw.trim_start().len();
        let location = SourceLocation::new(path, index + 1, indent + 1);

        if indent > 0 {
            if let Some(pending) = current.as_mut() {
                pending.body.push(line.to_owned());
            } else if !in_rejected_body {
                diagnostics.push(
                    Diagnostic::error("indented line does not belong to a Step")
                        .with_location(location),
                );
            }
            continue;
        }

        definitions.extend(current.take().map(finish));
        in_rejected_body = false;

        let Some(declaration) = strip_header(line) else {
            diagnostics.push(
                Diagnostic::error(format!("expected '{STEP_HEADER}' declaration, found '{line}'"))
                    .with_location(location),
            );
            continue;
        };

        match parse_declaration(declaration) {
            Ok((kind, pattern)) => {
                current = Some(Pending {
                    kind,
                    pattern,
                    location,
                    body: Vec::new(),
                });
            }
            Err(message) => {
                diagnostics.push(Diagnostic::error(message).with_location(location));
                in_rejected_body = true;
            }
        }
    }

    definitions.extend(current.take().map(finish));
    definitions
}

fn finish(pending: Pending) -> StepDefinition {
    StepDefinition::interaction(pending.kind, pending.pattern, pending.location, pending.body)
}

fn strip_header(line: &str) -> Option<&str> {
    let head = line.get(..STEP_HEADER.len())?;
    head.eq_ignore_ascii_case(STEP_HEADER)
        .then(|| line[STEP_HEADER.len()..].trim())
}

fn parse_declaration(declaration: &str) -> Result<(StepKind, StepPattern), String> {
    let (word, rest) = declaration
        .split_once(char::is_whitespace)
        .unwrap_or((declaration, ""));
    if word.is_empty() {
        return Err("Step declaration has no kind; expected Given, When or Then".to_owned());
    }
    let kind = word
        .parse::<StepKind>()
        .map_err(|()| format!("unknown step kind '{word}'; expected Given, When or Then"))?;
    let pattern = StepPattern::parse(rest).map_err(|e| e.to_string())?;
    Ok((kind, pattern))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
