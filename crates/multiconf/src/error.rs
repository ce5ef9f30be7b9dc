//! Error types for env and config resolution.
//!
//! Responsibilities:
//! - Define error variants for every env/config resolution failure.
//! - Classify which failures are "not found" conditions that a caller-supplied
//!   default may replace.
//!
//! Does NOT handle:
//! - Logging of recoverable conditions (callers log `EnvFileMissing` themselves).
//!
//! Invariants:
//! - All error variants include context for debugging (keys, paths, names).
//! - Only `EnvKeyNotFound` and `ConfigKeyNotFound` are swallowed by defaults.
//! - Env file errors never include raw line contents to prevent secret leakage.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while resolving env values and config fragments.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Env key is not found: {key}")]
    EnvKeyNotFound { key: String },

    /// The primary env file is absent. Recoverable: the env map starts empty.
    #[error("Env file not found at {path}")]
    EnvFileMissing { path: PathBuf },

    /// The default env file is the required baseline and must exist.
    #[error("Default env file not found at {path}")]
    EnvDefaultFileMissing { path: PathBuf },

    #[error("Config key '{segment}' is not found (path '{path}')")]
    ConfigKeyNotFound { segment: String, path: String },

    #[error("Config directory not found at {path}")]
    ConfigDirNotFound { path: PathBuf },

    #[error("Unsupported config fragment type: {path}")]
    UnsupportedConfigType { path: PathBuf },

    #[error("Too many nesting levels while loading config '{name}' (threshold {threshold})")]
    TooManyNesting { name: String, threshold: usize },

    #[error("Config '{name}' waits for '{dependency}', which has no fragment")]
    MissingDependency { name: String, dependency: String },

    #[error("Config path '{path}' is deeper than {limit} segments")]
    PathTooDeep { path: String, limit: usize },

    #[error("Failed to parse config fragment at {path}: {source}")]
    FragmentParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Config fragment '{fragment}' failed: {source}")]
    FragmentFailed {
        fragment: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Config value at '{path}' has an unexpected shape: {source}")]
    Deserialize {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid value for {var}: {message}")]
    InvalidValue { var: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    /// Whether this error is a lookup miss that a supplied default may replace.
    ///
    /// Structural failures (`TooManyNesting`, `UnsupportedConfigType`, parse errors,
    /// missing default env file, ...) always propagate.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ConfigError::EnvKeyNotFound { .. } | ConfigError::ConfigKeyNotFound { .. }
        )
    }

    pub(crate) fn key_not_found(segment: impl Into<String>, path: impl Into<String>) -> Self {
        ConfigError::ConfigKeyNotFound {
            segment: segment.into(),
            path: path.into(),
        }
    }
}

/// Replace a not-found error with `default` when one was supplied.
pub(crate) fn or_default<T>(
    result: Result<T, ConfigError>,
    default: Option<T>,
) -> Result<T, ConfigError> {
    match (result, default) {
        (Err(e), Some(default)) if e.is_not_found() => Ok(default),
        (result, _) => result,
    }
}
