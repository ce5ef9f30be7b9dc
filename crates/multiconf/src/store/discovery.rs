//! Config directory scanning.
//!
//! Responsibilities:
//! - Split fragment file names into config name, layer and extension.
//! - List the fragment files present in the config directory.
//!
//! Does NOT handle:
//! - Evaluating fragments (see `fragment`).
//! - Ordering candidates for merge (see `ConfigStore::candidates`).
//!
//! Invariants:
//! - Hidden files and directories are ignored.
//! - A config name never contains a dot: it is the file name up to its first dot.
//! - `{name}.{ext}` is the primary layer and `{name}.default.{ext}` the default
//!   layer; any other middle part leaves the layer unknown.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::constants::DEFAULT_LAYER_INFIX;
use crate::error::ConfigError;
use crate::fragment::Layer;

/// A fragment file name split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentFileName {
    pub name: String,
    /// `None` when the part between name and extension is not a known layer.
    pub layer: Option<Layer>,
    pub extension: String,
}

/// Parse `example.default.json` into (`example`, default, `json`).
///
/// Returns `None` for hidden files and names without an extension.
/// `app.v2.json` parses as name `app` with an unknown layer.
pub fn parse_file_name(file_name: &str) -> Option<FragmentFileName> {
    if file_name.starts_with('.') {
        return None;
    }
    let (stem, extension) = file_name.rsplit_once('.')?;
    if stem.is_empty() || extension.is_empty() {
        return None;
    }

    let (name, layer) = match stem.split_once('.') {
        None => (stem, Some(Layer::Primary)),
        Some((name, DEFAULT_LAYER_INFIX)) => (name, Some(Layer::Default)),
        Some((name, _)) => (name, None),
    };

    Some(FragmentFileName {
        name: name.to_string(),
        layer,
        extension: extension.to_string(),
    })
}

/// List fragment files in `config_dir`.
///
/// Returns `Ok(None)` when the directory does not exist.
pub fn scan(config_dir: &Path) -> Result<Option<Vec<(PathBuf, FragmentFileName)>>, ConfigError> {
    let entries = match std::fs::read_dir(config_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(ConfigError::Io(e)),
    };

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let file_name = entry.file_name();
        let Some(parsed) = file_name.to_str().and_then(parse_file_name) else {
            continue;
        };
        files.push((entry.path(), parsed));
    }
    files.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(Some(files))
}
