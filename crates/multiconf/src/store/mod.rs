//! Merged config cache and fragment discovery.
//!
//! Responsibilities:
//! - Own the config map (top-level name to merged value) and the loaded-names set.
//! - Locate the candidate fragments of a name in merge priority order.
//! - Resolve dot paths against the merged values.
//!
//! Does NOT handle:
//! - Evaluating fragments or driving dependency retries (see `resolver`).
//!
//! Invariants:
//! - A name enters the map only through `commit`, with the fully merged value.
//! - A committed name is loaded; the map is never mutated otherwise until `clear`.

pub mod discovery;
pub mod dot_path;
pub mod merge;

use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::error::ConfigError;
use crate::fragment::{Fragment, FragmentLoader, Layer};

/// A fragment paired with the loader that evaluates it.
pub(crate) type Candidate = (Arc<dyn FragmentLoader>, Fragment);

pub struct ConfigStore {
    config_dir: PathBuf,
    strict: bool,
    loaders: Vec<Arc<dyn FragmentLoader>>,
    values: Map<String, Value>,
    loaded: HashSet<String>,
}

impl ConfigStore {
    /// Create an empty store.
    ///
    /// With `strict`, a missing `config_dir` fails with `ConfigDirNotFound`;
    /// otherwise it behaves like an empty directory.
    pub fn new(config_dir: PathBuf, strict: bool, loaders: Vec<Arc<dyn FragmentLoader>>) -> Self {
        Self {
            config_dir,
            strict,
            loaders,
            values: Map::new(),
            loaded: HashSet::new(),
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn is_loaded(&self, name: &str) -> bool {
        self.loaded.contains(name)
    }

    /// Candidate fragments for `name` in merge order: for each loader in
    /// registration order, the default layer then the primary layer.
    ///
    /// File-backed candidates come only from the directory scan, so a name
    /// never reaches outside the config directory. A file of `name` that no
    /// loader reads (unknown extension or layer) fails with
    /// `UnsupportedConfigType`.
    pub(crate) fn candidates(&self, name: &str) -> Result<Vec<Candidate>, ConfigError> {
        let present = self.scan()?;
        let files: Vec<&(PathBuf, discovery::FragmentFileName)> =
            present.iter().filter(|entry| entry.1.name == name).collect();
        if let Some(entry) = files
            .iter()
            .find(|entry| entry.1.layer.is_none() || !self.reads_extension(&entry.1.extension))
        {
            return Err(ConfigError::UnsupportedConfigType {
                path: entry.0.clone(),
            });
        }

        let mut candidates = Vec::new();
        for loader in &self.loaders {
            for layer in Layer::MERGE_ORDER {
                let location = if loader.reads_files() {
                    files
                        .iter()
                        .find(|entry| {
                            entry.1.layer == Some(layer) && entry.1.extension == loader.extension()
                        })
                        .map(|entry| entry.0.clone())
                } else {
                    loader.locate_registered(&self.config_dir, &layer.stem(name))
                };
                if let Some(location) = location {
                    let fragment = Fragment {
                        name: name.to_string(),
                        layer,
                        location,
                    };
                    candidates.push((Arc::clone(loader), fragment));
                }
            }
        }
        Ok(candidates)
    }

    /// Every config name discoverable on disk or registered with a loader.
    pub fn names(&self) -> Result<Vec<String>, ConfigError> {
        let mut names: BTreeSet<String> =
            self.scan()?.into_iter().map(|(_, file)| file.name).collect();
        for loader in &self.loaders {
            names.extend(loader.registered_names());
        }
        Ok(names.into_iter().collect())
    }

    /// Record the merged value of `name` and mark it loaded.
    pub(crate) fn commit(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
        self.loaded.insert(name.to_string());
    }

    /// Resolve `path` against the merged values.
    pub fn lookup(&self, path: &str, max_depth: usize) -> Result<&Value, ConfigError> {
        dot_path::lookup(&self.values, path, max_depth)
    }

    /// Drop every cached value.
    pub fn clear(&mut self) {
        self.values.clear();
        self.loaded.clear();
    }

    fn reads_extension(&self, extension: &str) -> bool {
        self.loaders
            .iter()
            .any(|loader| loader.reads_files() && loader.extension() == extension)
    }

    fn scan(&self) -> Result<Vec<(PathBuf, discovery::FragmentFileName)>, ConfigError> {
        match discovery::scan(&self.config_dir)? {
            Some(files) => Ok(files),
            None if self.strict => Err(ConfigError::ConfigDirNotFound {
                path: self.config_dir.clone(),
            }),
            None => Ok(Vec::new()),
        }
    }
}
