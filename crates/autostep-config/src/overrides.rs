//! Command-line `key=value` override parsing.
//!
//! - `key=value` → `("key", "value")`
//! - `key` → `("key", "true")`
//! - `=value` → [`OverrideError::EmptyKey`]
//!
//! Only the first `=` separates key from value, so values may contain `=`.

use crate::errors::OverrideError;

/// Parse a single override token.
pub fn parse_override(token: &str) -> Result<(String, String), OverrideError> {
    let (key, value) = match token.split_once('=') {
        Some((key, value)) => (key.trim(), value),
        None => (token.trim(), "true"),
    };

    if key.is_empty() {
        return Err(OverrideError::EmptyKey {
            token: token.to_owned(),
        });
    }

    Ok((key.to_owned(), value.to_owned()))
}

/// Parse every token, keeping successes and failures apart.
///
/// A failing token contributes nothing to the accepted pairs.
pub fn parse_overrides<I, S>(tokens: I) -> (Vec<(String, String)>, Vec<OverrideError>)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut pairs = Vec::new();
    let mut errors = Vec::new();
    for token in tokens {
        match parse_override(token.as_ref()) {
            Ok(pair) => pairs.push(pair),
            Err(e) => errors.push(e),
        }
    }
    (pairs, errors)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
