use serde_json::Value;

use super::Resolver;
use crate::error::ConfigError;

/// What a code fragment sees while it is being evaluated.
///
/// Lookups made through the context count as one nesting level deeper than
/// the fragment's own load, so a fragment reading a config that (directly or
/// not) reads it back fails with `TooManyNesting` instead of recursing forever.
pub struct FragmentContext<'a> {
    resolver: &'a mut Resolver,
    name: &'a str,
    nesting: usize,
}

impl<'a> FragmentContext<'a> {
    pub(crate) fn new(resolver: &'a mut Resolver, name: &'a str, nesting: usize) -> Self {
        Self {
            resolver,
            name,
            nesting,
        }
    }

    /// Config name whose fragment is being evaluated.
    pub fn name(&self) -> &str {
        self.name
    }

    /// Declare that this fragment depends on `deps` (`"env"` and/or config
    /// names). Returns `true` when the fragment must return `Ok(None)` and will
    /// be retried once the dependencies are loaded.
    pub fn wait_for<I, S>(&mut self, deps: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.resolver.wait_for(self.name, deps)
    }

    /// Smart-transformed env value.
    pub fn env(&mut self, key: &str) -> Result<Value, ConfigError> {
        self.resolver.env(key, true, None)
    }

    pub fn env_or(&mut self, key: &str, default: impl Into<Value>) -> Result<Value, ConfigError> {
        self.resolver.env(key, true, Some(default.into()))
    }

    /// The raw env string, untransformed.
    pub fn env_raw(&mut self, key: &str) -> Result<String, ConfigError> {
        self.resolver.env_raw(key)
    }

    /// Value at `path`, loading its config first if needed.
    pub fn config(&mut self, path: &str) -> Result<Value, ConfigError> {
        self.resolver.config_at(path, None, self.nesting + 1)
    }

    pub fn config_or(&mut self, path: &str, default: impl Into<Value>) -> Result<Value, ConfigError> {
        self.resolver
            .config_at(path, Some(default.into()), self.nesting + 1)
    }
}
