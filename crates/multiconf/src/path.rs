//! Path helpers for env and config roots.
//!
//! Responsibilities:
//! - Collapse duplicate separators in caller-supplied root strings.
//! - Derive the config directory and env file locations from the roots.
//!
//! Does NOT handle:
//! - File I/O or existence checks.

use std::path::{Path, PathBuf};

use crate::constants::{CONFIG_DIR_NAME, ENV_DEFAULT_FILE, ENV_FILE};

/// Collapse runs of `/` (and `\` on Windows) into a single separator.
///
/// A leading double slash is collapsed as well; UNC paths are not supported.
pub fn collapse_separators(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut previous_was_separator = false;
    for ch in raw.chars() {
        let is_separator = ch == '/' || (cfg!(windows) && ch == '\\');
        if is_separator && previous_was_separator {
            continue;
        }
        previous_was_separator = is_separator;
        out.push(ch);
    }
    out
}

/// Normalize a root given as a string into a `PathBuf`.
pub fn normalize_root(raw: &str) -> PathBuf {
    PathBuf::from(collapse_separators(raw))
}

/// `<config_root>/config`
pub(crate) fn config_dir(config_root: &Path) -> PathBuf {
    config_root.join(CONFIG_DIR_NAME)
}

/// `<env_root>/.env`
pub(crate) fn env_file(env_root: &Path) -> PathBuf {
    env_root.join(ENV_FILE)
}

/// `<env_root>/.env.default`
pub(crate) fn env_default_file(env_root: &Path) -> PathBuf {
    env_root.join(ENV_DEFAULT_FILE)
}
