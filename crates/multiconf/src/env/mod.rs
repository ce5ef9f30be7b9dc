//! Env file loading and typed lookup.
//!
//! Responsibilities:
//! - Load the primary (`.env`) and default (`.env.default`) layers into one map.
//! - Look up keys with optional smart transformation into JSON values.
//!
//! Does NOT handle:
//! - Reading or writing the process environment (see `builder` for overrides).
//! - Lazy initialization or reloads (owned by the resolver).
//!
//! Invariants:
//! - Keys are the union of both layers; the primary layer wins on conflict.
//! - A missing primary file is a warning and yields an empty primary layer.
//! - A missing default file is fatal (`EnvDefaultFileMissing`).
//! - The map is immutable once built.

mod parser;

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::Path;

use serde_json::Value;

use crate::error::{ConfigError, or_default};
use crate::path::{env_default_file, env_file};

pub use parser::{EnvEntry, parse_line};

/// Merged view of the two env file layers.
#[derive(Debug, Clone, Default)]
pub struct EnvStore {
    values: HashMap<String, String>,
    primary_missing: bool,
}

impl EnvStore {
    /// Load `<env_root>/.env` and `<env_root>/.env.default`.
    pub fn load(env_root: &Path) -> Result<Self, ConfigError> {
        let primary_path = env_file(env_root);
        let primary = read_optional(&primary_path)?;
        if primary.is_none() {
            let warning = ConfigError::EnvFileMissing {
                path: primary_path.clone(),
            };
            tracing::warn!(error = %warning, "Continuing with default env values only");
        }

        let default_path = env_default_file(env_root);
        let default = read_optional(&default_path)?
            .ok_or(ConfigError::EnvDefaultFileMissing { path: default_path })?;

        let store = Self::from_layers(primary.as_deref(), &default);
        tracing::debug!(
            keys = store.values.len(),
            root = %env_root.display(),
            "Loaded env files"
        );
        Ok(store)
    }

    /// Build a store from already-read layer contents.
    pub fn from_layers(primary: Option<&str>, default: &str) -> Self {
        let mut values = HashMap::new();
        if let Some(primary) = primary {
            parser::parse_into(primary, &mut values, true);
        }
        parser::parse_into(default, &mut values, false);
        Self {
            values,
            primary_missing: primary.is_none(),
        }
    }

    /// Look up `key`, optionally smart-transforming the raw string.
    ///
    /// When the key is absent, `default` is returned if supplied, otherwise
    /// `EnvKeyNotFound`.
    pub fn get(
        &self,
        key: &str,
        smart_transform: bool,
        default: Option<Value>,
    ) -> Result<Value, ConfigError> {
        let found = self
            .raw(key)
            .map(|raw| {
                if smart_transform {
                    smart_value(raw)
                } else {
                    Value::String(raw.to_string())
                }
            })
            .ok_or_else(|| ConfigError::EnvKeyNotFound {
                key: key.to_string(),
            });
        or_default(found, default)
    }

    /// The untransformed value for `key`.
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Whether the primary `.env` file was absent when this store was built.
    pub fn primary_missing(&self) -> bool {
        self.primary_missing
    }
}

/// Coerce a raw env string: JSON first, then the `true`/`false` literals, else
/// the string unchanged.
pub fn smart_value(raw: &str) -> Value {
    if let Ok(value) = serde_json::from_str::<Value>(raw) {
        return value;
    }
    match raw {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::String(raw.to_string()),
    }
}

fn read_optional(path: &Path) -> Result<Option<String>, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(ConfigError::Io(e)),
    }
}
