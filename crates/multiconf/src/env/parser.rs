//! Line parser for `KEY=VALUE` env files.
//!
//! The grammar is deliberately smaller than dotenv's: no quoting, escaping or
//! `export` prefixes. Values are kept verbatim (after trimming) so that JSON text
//! such as `["foo","bar"]` survives for smart transformation.

use std::collections::HashMap;

/// One parsed assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvEntry {
    pub key: String,
    pub value: String,
}

/// Parse a single line.
///
/// Returns `None` for blank lines, `#` comments and lines whose key is empty.
/// A line without `=` yields its trimmed text as key with an empty value.
pub fn parse_line(line: &str) -> Option<EnvEntry> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }

    let (key, value) = trimmed.split_once('=').unwrap_or((trimmed, ""));
    let key = key.trim();
    if key.is_empty() {
        return None;
    }

    Some(EnvEntry {
        key: key.to_string(),
        value: value.trim().to_string(),
    })
}

/// Parse a whole file's content into `map`.
///
/// With `overwrite == false` keys already present in `map` are kept, which is how
/// the default layer fills in only what the primary layer left out.
pub fn parse_into(content: &str, map: &mut HashMap<String, String>, overwrite: bool) {
    for (index, line) in content.lines().enumerate() {
        match parse_line(line) {
            Some(entry) => {
                if overwrite || !map.contains_key(&entry.key) {
                    map.insert(entry.key, entry.value);
                }
            }
            None if line.trim_start().starts_with('=') => {
                // Line number only; the content may hold a secret.
                tracing::warn!(line = index + 1, "Skipping env line with an empty key");
            }
            None => {}
        }
    }
}
