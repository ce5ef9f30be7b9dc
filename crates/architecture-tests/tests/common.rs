//! Shared helpers for architecture tests.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Find the workspace root by looking for Cargo.toml with [workspace].
pub fn find_workspace_root() -> PathBuf {
    let current_dir = std::env::current_dir().expect("Failed to get current directory");

    let mut dir = current_dir.as_path();
    loop {
        let cargo_toml = dir.join("Cargo.toml");
        if let Ok(content) = fs::read_to_string(&cargo_toml)
            && content.contains("[workspace]")
        {
            return dir.to_path_buf();
        }
        match dir.parent() {
            Some(parent) => dir = parent,
            None => return current_dir,
        }
    }
}

/// All `.rs` files under `crates/`, excluding build output and this crate.
pub fn crate_sources(workspace_root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(workspace_root.join("crates"))
        .into_iter()
        .filter_entry(|e| {
            let name = e.file_name().to_string_lossy();
            name != "target" && name != "architecture-tests"
        })
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "rs"))
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}

/// Whether `path` only holds test code (integration tests or test submodules).
pub fn is_test_source(path: &Path) -> bool {
    let path_str = path.to_string_lossy().replace('\\', "/");
    path_str.contains("/tests/") || path_str.ends_with("_tests.rs")
}
