//! Fragment loaders.
//!
//! A fragment is one unit producing a (possibly partial) value for a top-level
//! config name, either as the primary layer (`{name}.{ext}`) or the default
//! layer (`{name}.default.{ext}`). Each supported format is a registered
//! [`FragmentLoader`]; the store asks every loader for candidates in
//! registration order and never branches on formats itself.
//!
//! Built-in formats:
//! - [`CodeLoader`]: Rust closures registered under a fragment stem. They can
//!   declare dependencies and read other values through [`FragmentContext`].
//! - [`JsonLoader`]: `.json` files decoded with `serde_json`.

mod code;
mod json;

use std::fmt;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::constants::DEFAULT_LAYER_INFIX;
use crate::error::ConfigError;
use crate::resolver::FragmentContext;

pub use code::{CodeFragmentFn, CodeLoader};
pub use json::JsonLoader;

/// Which layer of a config name a fragment provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    /// Lower-priority overlay merged underneath the primary layer.
    Default,
    Primary,
}

impl Layer {
    /// Layers in merge order: default first, so primary wins.
    pub const MERGE_ORDER: [Layer; 2] = [Layer::Default, Layer::Primary];

    /// File stem for `name` in this layer (`example` or `example.default`).
    pub fn stem(self, name: &str) -> String {
        match self {
            Layer::Default => format!("{name}.{DEFAULT_LAYER_INFIX}"),
            Layer::Primary => name.to_string(),
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layer::Default => write!(f, "default"),
            Layer::Primary => write!(f, "primary"),
        }
    }
}

/// A located fragment, ready to be evaluated by the loader that found it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub name: String,
    pub layer: Layer,
    /// On-disk path, or the path a registered code fragment stands in for.
    pub location: PathBuf,
}

impl Fragment {
    pub fn stem(&self) -> String {
        self.layer.stem(&self.name)
    }
}

/// A registered fragment format.
pub trait FragmentLoader: Send + Sync {
    /// File extension claimed by this format, without the dot.
    fn extension(&self) -> &str;

    /// Whether files with this extension found in the config directory are
    /// evaluated by this loader.
    fn reads_files(&self) -> bool {
        true
    }

    /// Locate a fragment that exists without a file (for example a registered
    /// closure). Only consulted for loaders that do not read files.
    fn locate_registered(&self, _config_dir: &Path, _stem: &str) -> Option<PathBuf> {
        None
    }

    /// Config names this loader knows about without scanning the directory.
    fn registered_names(&self) -> Vec<String> {
        Vec::new()
    }

    /// Evaluate a fragment.
    ///
    /// `Ok(None)` is the "not ready" signal: the fragment declared a wait (or has
    /// nothing to contribute yet).
    fn evaluate(
        &self,
        fragment: &Fragment,
        ctx: &mut FragmentContext<'_>,
    ) -> Result<Option<Value>, ConfigError>;
}
