//! Dot-path lookup into merged config values.
//!
//! `a.b.c` is walked one segment at a time. Objects are indexed by key and
//! lists by position, so `example.zoo.0` reaches the first list element.
//! A `null` leaf counts as absent.

use serde_json::{Map, Value};

use crate::error::ConfigError;

/// The top-level config name of a dot path (its first segment).
pub fn top_level_name(path: &str) -> &str {
    path.split_once('.').map_or(path, |(name, _)| name)
}

/// Resolve `path` against `root`.
///
/// Errors with `ConfigKeyNotFound` naming the first missing segment and the
/// full `path`, or `PathTooDeep` when `path` has more than `max_depth` segments.
pub fn lookup<'a>(
    root: &'a Map<String, Value>,
    path: &str,
    max_depth: usize,
) -> Result<&'a Value, ConfigError> {
    let depth = path.split('.').count();
    if depth > max_depth {
        return Err(ConfigError::PathTooDeep {
            path: path.to_string(),
            limit: max_depth,
        });
    }

    let mut segments = path.split('.');
    let first = segments.next().unwrap_or(path);
    let mut current = root
        .get(first)
        .filter(|value| !value.is_null())
        .ok_or_else(|| ConfigError::key_not_found(first, path))?;

    for segment in segments {
        current = child(current, segment).ok_or_else(|| ConfigError::key_not_found(segment, path))?;
    }
    Ok(current)
}

fn child<'a>(value: &'a Value, segment: &str) -> Option<&'a Value> {
    let found = match value {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    };
    found.filter(|value| !value.is_null())
}
