//! Lazy env/config resolution with dependency retries.
//!
//! Responsibilities:
//! - Load the env files on first use.
//! - Load a config name by evaluating its fragments in priority order and
//!   deep-merging them.
//! - Drive the wait list: when a fragment declares unsatisfied dependencies,
//!   load them, then retry the whole name from scratch.
//!
//! Does NOT handle:
//! - Locking (see `MultiConf`, which owns the resolver behind a mutex).
//! - Discovery and caching details (see `store`).
//!
//! Invariants:
//! - A name is loaded only when its merged value is non-null and no wait entry
//!   is outstanding for it.
//! - Every retry and every nested dependency load adds one nesting level; a
//!   resolution past the configured threshold fails with `TooManyNesting`.
//! - A partial merge is discarded whenever a fragment is not ready.

mod context;
mod wait_list;

#[cfg(test)]
mod tests;

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde_json::Value;

use crate::builder::Settings;
use crate::constants::ENV_DEPENDENCY;
use crate::env::EnvStore;
use crate::error::{ConfigError, or_default};
use crate::fragment::FragmentLoader;
use crate::store::merge::deep_merge_all;
use crate::store::{ConfigStore, dot_path};

pub use context::FragmentContext;
pub use wait_list::WaitList;

/// Where a config name is in its load lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadState {
    Unloaded,
    Loading,
    /// A fragment declared dependencies that are being loaded before a retry.
    Waiting,
    Loaded,
    /// The last resolution failed; the next access starts over.
    Failed,
}

enum Attempt {
    Merged(Value),
    Waiting,
    Empty,
}

/// Resolver state: env map, config cache, wait list and per-name states.
pub struct Resolver {
    settings: Settings,
    env: Option<EnvStore>,
    store: ConfigStore,
    waits: WaitList,
    states: HashMap<String, LoadState>,
}

impl Resolver {
    pub(crate) fn new(settings: Settings, loaders: Vec<Arc<dyn FragmentLoader>>) -> Self {
        let store = ConfigStore::new(
            settings.config_dir(),
            settings.strict_config_dir,
            loaders,
        );
        Self {
            settings,
            env: None,
            store,
            waits: WaitList::new(),
            states: HashMap::new(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn config_root(&self) -> &Path {
        &self.settings.config_root
    }

    pub fn env_root(&self) -> &Path {
        &self.settings.env_root
    }

    /// Load the env files if needed. With `force_reload`, rebuild the env map
    /// and drop every cached config; the new env map is swapped in only after it
    /// loaded successfully.
    pub fn init(&mut self, force_reload: bool) -> Result<(), ConfigError> {
        if force_reload || self.env.is_none() {
            let fresh = EnvStore::load(&self.settings.env_root)?;
            self.env = Some(fresh);
        }
        if force_reload {
            self.store.clear();
            self.waits = WaitList::new();
            self.states.clear();
            tracing::debug!("Discarded cached config values");
        }
        Ok(())
    }

    pub fn env_store(&mut self) -> Result<&EnvStore, ConfigError> {
        let env = match self.env.take() {
            Some(env) => env,
            None => EnvStore::load(&self.settings.env_root)?,
        };
        Ok(self.env.insert(env))
    }

    pub fn env(
        &mut self,
        key: &str,
        smart_transform: bool,
        default: Option<Value>,
    ) -> Result<Value, ConfigError> {
        self.env_store()?.get(key, smart_transform, default)
    }

    /// The raw env string, untransformed.
    pub fn env_raw(&mut self, key: &str) -> Result<String, ConfigError> {
        self.env_store()?
            .raw(key)
            .map(str::to_string)
            .ok_or_else(|| ConfigError::EnvKeyNotFound {
                key: key.to_string(),
            })
    }

    pub fn config(&mut self, path: &str, default: Option<Value>) -> Result<Value, ConfigError> {
        self.config_at(path, default, 0)
    }

    pub(crate) fn config_at(
        &mut self,
        path: &str,
        default: Option<Value>,
        nesting: usize,
    ) -> Result<Value, ConfigError> {
        let name = dot_path::top_level_name(path);
        let value = self
            .load_name(name, nesting)
            .and_then(|_| self.store.lookup(path, self.settings.max_path_depth).cloned());
        or_default(value, default)
    }

    /// Record that `name` depends on `deps`; see [`WaitList::wait_for`].
    pub fn wait_for<I, S>(&mut self, name: &str, deps: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let env_loaded = self.env.is_some();
        let store = &self.store;
        self.waits
            .wait_for(name, deps, env_loaded, |dep| store.is_loaded(dep))
    }

    pub fn state(&self, name: &str) -> LoadState {
        if self.store.is_loaded(name) {
            return LoadState::Loaded;
        }
        self.states
            .get(name)
            .copied()
            .unwrap_or(LoadState::Unloaded)
    }

    pub fn names(&self) -> Result<Vec<String>, ConfigError> {
        self.store.names()
    }

    /// Load every discoverable config name; returns the names that loaded.
    pub fn load_all(&mut self) -> Result<Vec<String>, ConfigError> {
        let mut loaded = Vec::new();
        for name in self.store.names()? {
            if self.load_name(&name, 0)? {
                loaded.push(name);
            }
        }
        Ok(loaded)
    }

    /// Load `name` unless it already is. Returns `false` when the name has no
    /// fragment (or only fragments that produced nothing).
    pub(crate) fn load_name(&mut self, name: &str, nesting: usize) -> Result<bool, ConfigError> {
        let result = self.drive(name, nesting);
        if result.is_err() {
            self.states.insert(name.to_string(), LoadState::Failed);
            self.waits.clear(name);
        }
        result
    }

    fn drive(&mut self, name: &str, mut nesting: usize) -> Result<bool, ConfigError> {
        loop {
            if self.store.is_loaded(name) {
                return Ok(true);
            }
            if nesting > self.settings.nesting_threshold {
                tracing::warn!(name, nesting, "Config nesting threshold exceeded");
                return Err(ConfigError::TooManyNesting {
                    name: name.to_string(),
                    threshold: self.settings.nesting_threshold,
                });
            }

            self.states.insert(name.to_string(), LoadState::Loading);
            match self.attempt(name, nesting)? {
                Attempt::Merged(value) => {
                    self.store.commit(name, value);
                    self.states.insert(name.to_string(), LoadState::Loaded);
                    tracing::debug!(name, nesting, "Loaded config");
                    return Ok(true);
                }
                Attempt::Empty => {
                    self.states.remove(name);
                    return Ok(false);
                }
                Attempt::Waiting => {
                    self.states.insert(name.to_string(), LoadState::Waiting);
                    let deps = self.waits.take(name);
                    tracing::debug!(name, ?deps, nesting, "Config waits for dependencies");
                    for dep in &deps {
                        self.resolve_dependency(name, dep, nesting + 1)?;
                    }
                    nesting += 1;
                }
            }
        }
    }

    fn attempt(&mut self, name: &str, nesting: usize) -> Result<Attempt, ConfigError> {
        let candidates = self.store.candidates(name)?;
        let mut layers = Vec::with_capacity(candidates.len());

        for (loader, fragment) in candidates {
            tracing::debug!(
                name,
                layer = %fragment.layer,
                location = %fragment.location.display(),
                "Evaluating config fragment"
            );
            let value = loader.evaluate(&fragment, &mut FragmentContext::new(self, name, nesting))?;
            if self.need_wait(name) {
                return Ok(Attempt::Waiting);
            }
            layers.extend(value);
        }

        let merged = deep_merge_all(layers);
        Ok(if merged.is_null() {
            Attempt::Empty
        } else {
            Attempt::Merged(merged)
        })
    }

    fn resolve_dependency(
        &mut self,
        name: &str,
        dependency: &str,
        nesting: usize,
    ) -> Result<(), ConfigError> {
        if dependency == ENV_DEPENDENCY {
            self.env_store()?;
            return Ok(());
        }
        if self.load_name(dependency, nesting)? {
            Ok(())
        } else {
            Err(ConfigError::MissingDependency {
                name: name.to_string(),
                dependency: dependency.to_string(),
            })
        }
    }

    fn need_wait(&mut self, name: &str) -> bool {
        let env_loaded = self.env.is_some();
        let store = &self.store;
        self.waits
            .need_wait(name, env_loaded, |dep| store.is_loaded(dep))
    }
}
