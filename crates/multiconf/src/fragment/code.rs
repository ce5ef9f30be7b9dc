//! Code fragments: closures registered under a fragment stem.
//!
//! A code fragment is the executable counterpart of a JSON fragment. It runs
//! with a [`FragmentContext`] so it can read env values, read other configs and
//! declare dependencies before producing its value:
//!
//! ```
//! use multiconf::CodeLoader;
//! use serde_json::json;
//!
//! let mut loader = CodeLoader::new();
//! loader.register("a-first-config", |ctx| {
//!     if ctx.wait_for(["env", "example"]) {
//!         return Ok(None);
//!     }
//!     Ok(Some(json!({
//!         "foo": "baz",
//!         "example-data": ctx.config_or("example", json!(""))?,
//!     })))
//! });
//! ```

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;

use super::{Fragment, FragmentLoader};
use crate::constants::DEFAULT_LAYER_INFIX;
use crate::error::ConfigError;
use crate::resolver::FragmentContext;

/// Signature of a code fragment.
pub type CodeFragmentFn =
    dyn Fn(&mut FragmentContext<'_>) -> anyhow::Result<Option<Value>> + Send + Sync;

/// Registry of code fragments keyed by stem (`name` or `name.default`).
#[derive(Clone, Default)]
pub struct CodeLoader {
    fragments: HashMap<String, Arc<CodeFragmentFn>>,
}

impl CodeLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the fragment for `stem`.
    pub fn register<F>(&mut self, stem: impl Into<String>, fragment: F)
    where
        F: Fn(&mut FragmentContext<'_>) -> anyhow::Result<Option<Value>> + Send + Sync + 'static,
    {
        self.fragments.insert(stem.into(), Arc::new(fragment));
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

impl fmt::Debug for CodeLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut stems: Vec<&String> = self.fragments.keys().collect();
        stems.sort();
        f.debug_struct("CodeLoader").field("stems", &stems).finish()
    }
}

impl FragmentLoader for CodeLoader {
    fn extension(&self) -> &str {
        "code"
    }

    fn reads_files(&self) -> bool {
        false
    }

    fn locate_registered(&self, config_dir: &Path, stem: &str) -> Option<PathBuf> {
        self.fragments
            .contains_key(stem)
            .then(|| config_dir.join(format!("{stem}.{}", self.extension())))
    }

    fn registered_names(&self) -> Vec<String> {
        let suffix = format!(".{DEFAULT_LAYER_INFIX}");
        let names: BTreeSet<String> = self
            .fragments
            .keys()
            .map(|stem| stem.strip_suffix(&suffix).unwrap_or(stem).to_string())
            .collect();
        names.into_iter().collect()
    }

    fn evaluate(
        &self,
        fragment: &Fragment,
        ctx: &mut FragmentContext<'_>,
    ) -> Result<Option<Value>, ConfigError> {
        let stem = fragment.stem();
        let Some(code) = self.fragments.get(&stem) else {
            return Err(ConfigError::UnsupportedConfigType {
                path: fragment.location.clone(),
            });
        };

        code(ctx).map_err(|error| match error.downcast::<ConfigError>() {
            Ok(config_error) => config_error,
            Err(source) => ConfigError::FragmentFailed {
                fragment: stem,
                source,
            },
        })
    }
}
