//! The `MultiConf` façade.
//!
//! Responsibilities:
//! - Expose `env`/`config` lookups with default-value fallback.
//! - Initialize lazily on first access and reload on request.
//! - Classify the deployment environment from the `ENV` value.
//!
//! Does NOT handle:
//! - Resolution mechanics (see `resolver`).
//!
//! Invariants / Assumptions:
//! - All state lives behind one mutex; concurrent first accesses serialize on it.
//! - Fragments never call back into the façade (they get a `FragmentContext`),
//!   so the lock is never re-entered.
//! - A forced reload is invisible to other callers until it completes.

use std::fmt;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::builder::ResolverBuilder;
use crate::environment::AppEnvironment;
use crate::error::ConfigError;
use crate::resolver::{LoadState, Resolver};

/// Process-wide env and config resolver.
///
/// Construct one per process and share it (`Arc<MultiConf>` or a reference);
/// it is `Send + Sync`.
pub struct MultiConf {
    inner: Mutex<Resolver>,
}

impl MultiConf {
    pub fn builder() -> ResolverBuilder {
        ResolverBuilder::new()
    }

    /// Resolver rooted at the `MULTICONF_*` overrides or the working directory.
    pub fn from_env() -> Result<Self, ConfigError> {
        ResolverBuilder::new().from_env()?.build()
    }

    pub(crate) fn from_resolver(resolver: Resolver) -> Self {
        Self {
            inner: Mutex::new(resolver),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Resolver> {
        // Every mutation leaves the resolver consistent, so a poisoned lock is usable.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Load the env files now instead of on first access. With `force_reload`,
    /// re-read them and drop every cached config value.
    pub fn init(&self, force_reload: bool) -> Result<(), ConfigError> {
        self.lock().init(force_reload)
    }

    /// Smart-transformed env value: JSON-decoded when the raw string is JSON,
    /// `true`/`false` as booleans, else the string.
    pub fn env(&self, key: &str) -> Result<Value, ConfigError> {
        self.lock().env(key, true, None)
    }

    /// Like [`MultiConf::env`], returning `default` when the key is absent.
    pub fn env_or(&self, key: &str, default: impl Into<Value>) -> Result<Value, ConfigError> {
        self.lock().env(key, true, Some(default.into()))
    }

    /// The raw env string, untransformed.
    pub fn env_raw(&self, key: &str) -> Result<String, ConfigError> {
        self.lock().env_raw(key)
    }

    /// Smart-transformed value of the environment key (`ENV` unless
    /// configured with `with_env_key`).
    pub fn app_env(&self) -> Result<Value, ConfigError> {
        let mut resolver = self.lock();
        let key = resolver.settings().env_key.clone();
        resolver.env(&key, true, None)
    }

    /// Full-control env lookup.
    pub fn env_with(
        &self,
        key: &str,
        smart_transform: bool,
        default: Option<Value>,
    ) -> Result<Value, ConfigError> {
        self.lock().env(key, smart_transform, default)
    }

    /// Value at dot path `path` (`name.key.sub`), loading `name` on first use.
    pub fn config(&self, path: &str) -> Result<Value, ConfigError> {
        self.lock().config(path, None)
    }

    /// Like [`MultiConf::config`], returning `default` when the path is absent.
    ///
    /// Structural failures (`TooManyNesting`, `UnsupportedConfigType`, ...) still
    /// propagate.
    pub fn config_or(&self, path: &str, default: impl Into<Value>) -> Result<Value, ConfigError> {
        self.lock().config(path, Some(default.into()))
    }

    /// Deserialize the value at `path` into `T`.
    pub fn config_as<T: DeserializeOwned>(&self, path: &str) -> Result<T, ConfigError> {
        let value = self.config(path)?;
        serde_json::from_value(value).map_err(|source| ConfigError::Deserialize {
            path: path.to_string(),
            source,
        })
    }

    /// Declare that config `name` depends on `deps` (`"env"` and/or config
    /// names). Returns whether `name` still has to wait.
    pub fn wait_for<I, S>(&self, name: &str, deps: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lock().wait_for(name, deps)
    }

    /// Load every discoverable config; returns the names that loaded.
    pub fn load_all(&self) -> Result<Vec<String>, ConfigError> {
        self.lock().load_all()
    }

    /// Every config name found in the config directory or registered in code.
    pub fn names(&self) -> Result<Vec<String>, ConfigError> {
        self.lock().names()
    }

    pub fn state(&self, name: &str) -> LoadState {
        self.lock().state(name)
    }

    pub fn config_root(&self) -> PathBuf {
        self.lock().config_root().to_path_buf()
    }

    pub fn env_root(&self) -> PathBuf {
        self.lock().env_root().to_path_buf()
    }

    pub fn nesting_threshold(&self) -> usize {
        self.lock().settings().nesting_threshold
    }

    /// The deployment environment named by the `ENV` value, if recognized.
    ///
    /// A missing `ENV` key yields `None`; env load failures propagate.
    pub fn environment(&self) -> Result<Option<AppEnvironment>, ConfigError> {
        let mut resolver = self.lock();
        let key = resolver.settings().env_key.clone();
        let sets = resolver.settings().environment_sets.clone();
        Ok(resolver.env_store()?.raw(&key).and_then(|raw| sets.classify(raw)))
    }

    pub fn is_loc(&self) -> Result<bool, ConfigError> {
        self.is(AppEnvironment::Local)
    }

    pub fn is_dev(&self) -> Result<bool, ConfigError> {
        self.is(AppEnvironment::Development)
    }

    pub fn is_test(&self) -> Result<bool, ConfigError> {
        self.is(AppEnvironment::Testing)
    }

    pub fn is_stage(&self) -> Result<bool, ConfigError> {
        self.is(AppEnvironment::Staging)
    }

    pub fn is_prod(&self) -> Result<bool, ConfigError> {
        self.is(AppEnvironment::Production)
    }

    fn is(&self, environment: AppEnvironment) -> Result<bool, ConfigError> {
        let mut resolver = self.lock();
        let key = resolver.settings().env_key.clone();
        let sets = resolver.settings().environment_sets.clone();
        Ok(resolver
            .env_store()?
            .raw(&key)
            .is_some_and(|raw| sets.matches(environment, raw)))
    }
}

impl fmt::Debug for MultiConf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let resolver = self.lock();
        f.debug_struct("MultiConf")
            .field("config_root", &resolver.config_root())
            .field("env_root", &resolver.env_root())
            .finish_non_exhaustive()
    }
}
