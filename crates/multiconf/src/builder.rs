//! Resolver builder.
//!
//! Responsibilities:
//! - Collect roots, limits, environment sets and fragment loaders.
//! - Apply process environment overrides (`MULTICONF_*`) on request.
//! - Build the `MultiConf` façade.
//!
//! Does NOT handle:
//! - Reading env files or fragments (nothing touches disk until first access).
//!
//! Invariants / Assumptions:
//! - Builder methods take precedence over process environment overrides.
//! - Unset roots default to the process working directory.
//! - Code fragments are consulted before JSON fragments; extra loaders come last.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;

use crate::constants::{
    CONFIG_ROOT_VAR, DEFAULT_ENV_KEY, DEFAULT_MAX_PATH_DEPTH, DEFAULT_NESTING_THRESHOLD,
    ENV_ROOT_VAR, NESTING_THRESHOLD_VAR,
};
use crate::environment::EnvironmentSets;
use crate::error::ConfigError;
use crate::fragment::{CodeLoader, FragmentLoader, JsonLoader};
use crate::multiconf::MultiConf;
use crate::path::{config_dir, normalize_root};
use crate::resolver::{FragmentContext, Resolver};

/// Read an environment variable, returning None if unset, empty, or whitespace-only.
/// Returns the trimmed value (leading/trailing whitespace removed) if present.
pub fn env_var_or_none(key: &str) -> Option<String> {
    std::env::var(key).ok().and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Resolved resolver settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub config_root: PathBuf,
    pub env_root: PathBuf,
    pub nesting_threshold: usize,
    pub max_path_depth: usize,
    pub strict_config_dir: bool,
    pub env_key: String,
    pub environment_sets: EnvironmentSets,
}

impl Settings {
    /// `<config_root>/config`
    pub fn config_dir(&self) -> PathBuf {
        config_dir(&self.config_root)
    }
}

/// Builder for [`MultiConf`].
pub struct ResolverBuilder {
    config_root: Option<PathBuf>,
    env_root: Option<PathBuf>,
    nesting_threshold: Option<usize>,
    max_path_depth: usize,
    strict_config_dir: bool,
    env_key: String,
    environment_sets: EnvironmentSets,
    code: CodeLoader,
    extra_loaders: Vec<Arc<dyn FragmentLoader>>,
}

impl Default for ResolverBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ResolverBuilder {
    pub fn new() -> Self {
        Self {
            config_root: None,
            env_root: None,
            nesting_threshold: None,
            max_path_depth: DEFAULT_MAX_PATH_DEPTH,
            strict_config_dir: true,
            env_key: DEFAULT_ENV_KEY.to_string(),
            environment_sets: EnvironmentSets::default(),
            code: CodeLoader::new(),
            extra_loaders: Vec::new(),
        }
    }

    /// Directory holding the `config/` fragment directory.
    pub fn with_config_root(mut self, root: impl AsRef<Path>) -> Self {
        self.config_root = Some(normalize(root.as_ref()));
        self
    }

    /// Directory holding `.env` and `.env.default`.
    pub fn with_env_root(mut self, root: impl AsRef<Path>) -> Self {
        self.env_root = Some(normalize(root.as_ref()));
        self
    }

    /// Use the same directory for config fragments and env files.
    pub fn with_root(self, root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        self.with_config_root(root).with_env_root(root)
    }

    /// Maximum nesting level for dependency retries (default 10).
    pub fn with_nesting_threshold(mut self, threshold: usize) -> Self {
        self.nesting_threshold = Some(threshold);
        self
    }

    /// Maximum number of segments accepted in a dot path (default 64).
    pub fn with_max_path_depth(mut self, depth: usize) -> Self {
        self.max_path_depth = depth;
        self
    }

    /// Whether a missing config directory is an error (default) or an empty set.
    pub fn strict_config_dir(mut self, strict: bool) -> Self {
        self.strict_config_dir = strict;
        self
    }

    /// Env key read by the environment predicates (default `ENV`).
    pub fn with_env_key(mut self, key: impl Into<String>) -> Self {
        self.env_key = key.into();
        self
    }

    pub fn with_environment_sets(mut self, sets: EnvironmentSets) -> Self {
        self.environment_sets = sets;
        self
    }

    /// Register a code fragment under `stem` (`name` or `name.default`).
    pub fn with_code_fragment<F>(mut self, stem: impl Into<String>, fragment: F) -> Self
    where
        F: Fn(&mut FragmentContext<'_>) -> anyhow::Result<Option<Value>> + Send + Sync + 'static,
    {
        self.code.register(stem, fragment);
        self
    }

    /// Register an additional fragment format, consulted after the built-in ones.
    pub fn with_loader(mut self, loader: Arc<dyn FragmentLoader>) -> Self {
        self.extra_loaders.push(loader);
        self
    }

    /// Apply `MULTICONF_CONFIG_ROOT`, `MULTICONF_ENV_ROOT` and
    /// `MULTICONF_NESTING_THRESHOLD` for values not already set on the builder.
    pub fn from_env(mut self) -> Result<Self, ConfigError> {
        if self.config_root.is_none()
            && let Some(root) = env_var_or_none(CONFIG_ROOT_VAR)
        {
            self.config_root = Some(normalize_root(&root));
        }
        if self.env_root.is_none()
            && let Some(root) = env_var_or_none(ENV_ROOT_VAR)
        {
            self.env_root = Some(normalize_root(&root));
        }
        if self.nesting_threshold.is_none()
            && let Some(threshold) = env_var_or_none(NESTING_THRESHOLD_VAR)
        {
            let value: usize = threshold.parse().map_err(|_| ConfigError::InvalidValue {
                var: NESTING_THRESHOLD_VAR.to_string(),
                message: "must be a non-negative integer".to_string(),
            })?;
            self.nesting_threshold = Some(value);
        }
        Ok(self)
    }

    /// Build the resolver. Nothing is read from disk yet.
    pub fn build(self) -> Result<MultiConf, ConfigError> {
        let (config_root, env_root) = match (self.config_root, self.env_root) {
            (Some(config_root), Some(env_root)) => (config_root, env_root),
            (config_root, env_root) => {
                let cwd = std::env::current_dir()?;
                (
                    config_root.unwrap_or_else(|| cwd.clone()),
                    env_root.unwrap_or(cwd),
                )
            }
        };

        let settings = Settings {
            config_root,
            env_root,
            nesting_threshold: self.nesting_threshold.unwrap_or(DEFAULT_NESTING_THRESHOLD),
            max_path_depth: self.max_path_depth,
            strict_config_dir: self.strict_config_dir,
            env_key: self.env_key,
            environment_sets: self.environment_sets,
        };

        let mut loaders: Vec<Arc<dyn FragmentLoader>> =
            vec![Arc::new(self.code), Arc::new(JsonLoader)];
        loaders.extend(self.extra_loaders);

        tracing::debug!(
            config_dir = %settings.config_dir().display(),
            env_root = %settings.env_root.display(),
            nesting_threshold = settings.nesting_threshold,
            "Built config resolver"
        );
        Ok(MultiConf::from_resolver(Resolver::new(settings, loaders)))
    }
}

fn normalize(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(raw) => normalize_root(raw),
        None => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_env_var_or_none_filters_empty_and_whitespace_strings() {
        let key = "_MULTICONF_TEST_VAR";
        temp_env::with_vars([(key, None::<&str>)], || {
            assert!(env_var_or_none(key).is_none());
        });
        temp_env::with_vars([(key, Some("   "))], || {
            assert!(env_var_or_none(key).is_none());
        });
        temp_env::with_vars([(key, Some(" value "))], || {
            assert_eq!(env_var_or_none(key), Some("value".to_string()));
        });
    }

    #[test]
    #[serial]
    fn test_from_env_applies_overrides() {
        temp_env::with_vars(
            [
                (CONFIG_ROOT_VAR, Some("/srv//app")),
                (ENV_ROOT_VAR, Some("/etc/app")),
                (NESTING_THRESHOLD_VAR, Some("3")),
            ],
            || {
                let conf = ResolverBuilder::new().from_env().unwrap().build().unwrap();
                assert_eq!(conf.config_root(), PathBuf::from("/srv/app"));
                assert_eq!(conf.env_root(), PathBuf::from("/etc/app"));
                assert_eq!(conf.nesting_threshold(), 3);
            },
        );
    }

    #[test]
    #[serial]
    fn test_builder_values_win_over_env_overrides() {
        temp_env::with_vars(
            [
                (CONFIG_ROOT_VAR, Some("/srv/from-env")),
                (NESTING_THRESHOLD_VAR, Some("3")),
            ],
            || {
                let conf = ResolverBuilder::new()
                    .with_config_root("/srv/explicit")
                    .with_env_root("/srv/explicit")
                    .with_nesting_threshold(5)
                    .from_env()
                    .unwrap()
                    .build()
                    .unwrap();
                assert_eq!(conf.config_root(), PathBuf::from("/srv/explicit"));
                assert_eq!(conf.nesting_threshold(), 5);
            },
        );
    }

    #[test]
    #[serial]
    fn test_invalid_nesting_threshold_is_rejected() {
        temp_env::with_vars([(NESTING_THRESHOLD_VAR, Some("many"))], || {
            match ResolverBuilder::new().from_env() {
                Err(ConfigError::InvalidValue { var, .. }) => {
                    assert_eq!(var, NESTING_THRESHOLD_VAR)
                }
                Err(other) => panic!("expected InvalidValue, got {}", other),
                Ok(_) => panic!("expected InvalidValue, got Ok"),
            }
        });
    }

    #[test]
    #[serial]
    fn test_unset_roots_default_to_working_directory() {
        temp_env::with_vars(
            [
                (CONFIG_ROOT_VAR, None::<&str>),
                (ENV_ROOT_VAR, None),
                (NESTING_THRESHOLD_VAR, None),
            ],
            || {
                let cwd = std::env::current_dir().unwrap();
                let conf = ResolverBuilder::new().from_env().unwrap().build().unwrap();
                assert_eq!(conf.config_root(), cwd);
                assert_eq!(conf.env_root(), cwd);
                assert_eq!(conf.nesting_threshold(), DEFAULT_NESTING_THRESHOLD);
            },
        );
    }
}
