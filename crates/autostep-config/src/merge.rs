//! JSON tree helpers shared by the configuration layers.
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Keys are matched case-insensitively; the target's spelling is kept
//! - An array target merged with an index-keyed object (`{"0": ..}`), as
//!   produced by environment and command-line layers, is merged per index
//! - Other arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use serde_json::{Map, Value};

/// Recursive deep merge of two JSON values.
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let existing = find_key(&target_map, &key).map(str::to_owned);
                let (key, merged) = match existing {
                    Some(existing) => {
                        let target_val = target_map.remove(&existing).unwrap_or(Value::Null);
                        (existing, deep_merge(target_val, source_val))
                    }
                    None => (key, source_val),
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (Value::Array(items), Value::Object(source_map)) if is_index_map(&source_map) => {
            let indexed = items
                .into_iter()
                .enumerate()
                .map(|(i, v)| (i.to_string(), v))
                .collect::<Map<_, _>>();
            deep_merge(Value::Object(indexed), Value::Object(source_map))
        }
        (_, source) => source,
    }
}

/// Look up a `:`-separated key path, matching each segment case-insensitively.
///
/// Array elements are addressed by their decimal index.
pub fn get_path<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = root;
    for segment in path.split(crate::KEY_SEPARATOR).filter(|s| !s.is_empty()) {
        current = match current {
            Value::Object(map) => {
                let key = find_key(map, segment)?;
                map.get(key)?
            }
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Insert `value` at a `:`-separated key path, creating objects as needed.
///
/// Non-object values found along the path are replaced.
pub fn insert_path(root: &mut Value, path: &str, value: Value) {
    let segments: Vec<&str> = path
        .split(crate::KEY_SEPARATOR)
        .filter(|s| !s.is_empty())
        .collect();
    let Some((last, parents)) = segments.split_last() else {
        return;
    };

    let mut current = root;
    for segment in parents {
        if !current.is_object() {
            *current = Value::Object(Map::new());
        }
        let Value::Object(map) = current else {
            return;
        };
        let key = find_key(map, segment).map_or_else(|| (*segment).to_owned(), str::to_owned);
        current = map
            .entry(key)
            .or_insert_with(|| Value::Object(Map::new()));
    }

    if !current.is_object() {
        *current = Value::Object(Map::new());
    }
    if let Value::Object(map) = current {
        let key = find_key(map, last).map_or_else(|| (*last).to_owned(), str::to_owned);
        let _ = map.insert(key, value);
    }
}

/// Render a scalar configuration value as a string.
///
/// Objects and arrays have no scalar form and return `None`.
pub fn value_as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Read a configuration value as a list.
///
/// Accepts a JSON array, an index-keyed object (`{"0": .., "1": ..}`) ordered
/// by index, or a single scalar (a one-element list).
pub fn value_as_list(value: &Value) -> Option<Vec<&Value>> {
    match value {
        Value::Array(items) => Some(items.iter().collect()),
        Value::Object(map) if is_index_map(map) => {
            let mut entries: Vec<(usize, &Value)> = map
                .iter()
                .filter_map(|(k, v)| k.parse::<usize>().ok().map(|i| (i, v)))
                .collect();
            entries.sort_by_key(|(i, _)| *i);
            Some(entries.into_iter().map(|(_, v)| v).collect())
        }
        Value::Object(_) | Value::Null => None,
        scalar => Some(vec![scalar]),
    }
}

/// Parse a string as a boolean.
///
/// Accepts (case-insensitive): `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`.
pub fn parse_bool(val: &str) -> Option<bool> {
    match val.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Read a configuration value as a boolean (JSON bool or boolean-like string).
pub fn value_as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => parse_bool(s),
        Value::Number(n) => n.as_i64().map(|n| n != 0),
        _ => None,
    }
}

fn find_key<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    if map.contains_key(key) {
        return map.get_key_value(key).map(|(k, _)| k.as_str());
    }
    map.keys()
        .find(|k| k.eq_ignore_ascii_case(key))
        .map(String::as_str)
}

fn is_index_map(map: &Map<String, Value>) -> bool {
    !map.is_empty() && map.keys().all(|k| k.parse::<usize>().is_ok())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
