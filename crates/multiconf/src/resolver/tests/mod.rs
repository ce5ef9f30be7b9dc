//! Tests for config resolution.
//!
//! Responsibilities:
//! - Test fragment layering and merge priority.
//! - Test dependency waits, retries and the nesting threshold.
//! - Test caching and forced reloads.
//!
//! Invariants:
//! - Every test works in its own `tempfile` directory; no process-global state
//!   (cwd/env vars) is touched, so tests run in parallel.

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use crate::MultiConf;
use crate::builder::ResolverBuilder;

mod dependency_tests;

pub const DEFAULT_ENV: &str = "ENV=PROD\nDB_HOST=db.internal\nDB_NAME=project\n";

/// A temporary root with a `config/` directory and a `.env.default` file.
pub struct Fixture {
    dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("config")).unwrap();
        fs::write(dir.path().join(".env.default"), DEFAULT_ENV).unwrap();
        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Write `content` to `config/{file_name}`.
    pub fn config_file(&self, file_name: &str, content: &str) -> &Self {
        fs::write(self.dir.path().join("config").join(file_name), content).unwrap();
        self
    }

    pub fn env_file(&self, content: &str) -> &Self {
        fs::write(self.dir.path().join(".env"), content).unwrap();
        self
    }

    pub fn builder(&self) -> ResolverBuilder {
        MultiConf::builder().with_root(self.root())
    }

    pub fn build(&self) -> MultiConf {
        self.builder().build().unwrap()
    }
}
