//! Shared fixtures for bundler integration tests.

#![allow(dead_code)]

use std::fs;

use tempfile::TempDir;

/// Write `(relative path, content)` fixtures into a fresh temp directory.
pub fn project(files: &[(&str, &str)]) -> TempDir {
    let temp = TempDir::new().unwrap();
    for (relative, content) in files {
        let path = temp.path().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }
    temp
}
