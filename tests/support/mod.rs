//! Test support utilities for fieldseal integration tests.
//!
//! Provides mock encryption services, document fixtures and CLI helpers.

#![allow(dead_code)]

pub mod assertions;
pub mod commands;
pub mod fixtures;
pub mod services;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use fixtures::*;
#[allow(unused_imports)]
pub use services::*;

use tempfile::TempDir;

/// Test environment with an isolated working directory.
///
/// Child processes use `.current_dir()` so tests can run in parallel.
pub struct Test {
    /// Temporary directory the CLI runs in
    pub dir: TempDir,
}

impl Test {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        Self { dir }
    }

    /// Create a test environment with `fieldseal.toml` written.
    pub fn with_config(contents: &str) -> Self {
        let t = Self::new();
        t.write_config(contents);
        t
    }

    pub fn write_config(&self, contents: &str) {
        std::fs::write(self.dir.path().join("fieldseal.toml"), contents)
            .expect("failed to write config");
    }
}
