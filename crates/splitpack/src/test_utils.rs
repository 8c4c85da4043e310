//! Test utilities for splitpack.
//!
//! - `TestRuntime`: real filesystem access rooted in a temporary directory
//! - `MemoryRuntime`: an in-memory file map for graph tests that need
//!   neither a disk nor a tokio blocking pool
//!
//! Both complete every operation without suspending, which makes module id
//! assignment depth-first and deterministic in tests.

// Test utilities are allowed to use std::fs since they only run on native platforms
#![allow(clippy::disallowed_methods)]

use crate::{FileMetadata, Runtime, RuntimeError, RuntimeResult};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Simple test runtime that wraps std::fs for native tests.
///
/// ```rust,ignore
/// use splitpack::test_utils::TestRuntime;
/// use tempfile::TempDir;
///
/// let temp = TempDir::new().unwrap();
/// let runtime = TestRuntime::new(temp.path().to_path_buf());
/// let index = runtime.write("src/index.js", "require('./a');");
/// assert!(index.ends_with("src/index.js"));
/// ```
#[derive(Debug)]
pub struct TestRuntime {
    root: PathBuf,
}

impl TestRuntime {
    /// Create a new test runtime rooted at `root`.
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// The fixture root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write a fixture file relative to the root, creating parent directories.
    ///
    /// Returns the absolute path of the written file.
    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, content).unwrap();
        path
    }
}

#[async_trait]
impl Runtime for TestRuntime {
    async fn read_file(&self, path: &Path) -> RuntimeResult<Vec<u8>> {
        std::fs::read(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                RuntimeError::FileNotFound(path.to_path_buf())
            } else {
                RuntimeError::Io(e.to_string())
            }
        })
    }

    async fn write_file(&self, path: &Path, content: &[u8]) -> RuntimeResult<()> {
        std::fs::write(path, content).map_err(|e| RuntimeError::Io(e.to_string()))
    }

    async fn metadata(&self, path: &Path) -> RuntimeResult<FileMetadata> {
        let metadata = std::fs::metadata(path).map_err(|e| RuntimeError::Io(e.to_string()))?;
        Ok(FileMetadata {
            size: metadata.len(),
            is_file: metadata.is_file(),
            is_dir: metadata.is_dir(),
            modified: metadata
                .modified()
                .ok()
                .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
                .map(|d| d.as_millis() as u64),
        })
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    async fn create_dir(&self, path: &Path, recursive: bool) -> RuntimeResult<()> {
        if recursive {
            std::fs::create_dir_all(path).map_err(|e| RuntimeError::Io(e.to_string()))
        } else {
            std::fs::create_dir(path).map_err(|e| RuntimeError::Io(e.to_string()))
        }
    }
}

/// In-memory runtime keyed by absolute path.
///
/// Directories exist implicitly: a path is a directory when some stored file
/// lives beneath it.
#[derive(Debug, Default)]
pub struct MemoryRuntime {
    files: Mutex<BTreeMap<PathBuf, Vec<u8>>>,
}

impl MemoryRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a runtime from `(path, content)` pairs.
    pub fn with_files<P, C>(files: impl IntoIterator<Item = (P, C)>) -> Self
    where
        P: Into<PathBuf>,
        C: AsRef<[u8]>,
    {
        let runtime = Self::new();
        for (path, content) in files {
            runtime.insert(path, content);
        }
        runtime
    }

    pub fn insert(&self, path: impl Into<PathBuf>, content: impl AsRef<[u8]>) {
        self.files
            .lock()
            .insert(path.into(), content.as_ref().to_vec());
    }

    /// Contents of a stored file, if any.
    pub fn contents(&self, path: &Path) -> Option<Vec<u8>> {
        self.files.lock().get(path).cloned()
    }

    /// All stored paths in sorted order.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.lock().keys().cloned().collect()
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.files
            .lock()
            .keys()
            .any(|file| file != path && file.starts_with(path))
    }
}

#[async_trait]
impl Runtime for MemoryRuntime {
    async fn read_file(&self, path: &Path) -> RuntimeResult<Vec<u8>> {
        self.contents(path)
            .ok_or_else(|| RuntimeError::FileNotFound(path.to_path_buf()))
    }

    async fn write_file(&self, path: &Path, content: &[u8]) -> RuntimeResult<()> {
        self.insert(path, content);
        Ok(())
    }

    async fn metadata(&self, path: &Path) -> RuntimeResult<FileMetadata> {
        if let Some(content) = self.contents(path) {
            return Ok(FileMetadata {
                size: content.len() as u64,
                is_dir: false,
                is_file: true,
                modified: None,
            });
        }
        if self.is_dir(path) {
            return Ok(FileMetadata {
                size: 0,
                is_dir: true,
                is_file: false,
                modified: None,
            });
        }
        Err(RuntimeError::FileNotFound(path.to_path_buf()))
    }

    fn exists(&self, path: &Path) -> bool {
        let is_file = self.files.lock().contains_key(path);
        is_file || self.is_dir(path)
    }

    async fn create_dir(&self, _path: &Path, _recursive: bool) -> RuntimeResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_runtime_writes_fixtures_under_root() {
        let temp = TempDir::new().unwrap();
        let runtime = TestRuntime::new(temp.path().to_path_buf());

        let path = runtime.write("lib/a.js", "module.exports = 1;");
        assert_eq!(path, temp.path().join("lib/a.js"));

        let content = runtime.read_file(&path).await.unwrap();
        assert_eq!(content, b"module.exports = 1;");
        assert!(runtime.metadata(&temp.path().join("lib")).await.unwrap().is_dir);
    }

    #[tokio::test]
    async fn test_memory_runtime_implicit_directories() {
        let runtime = MemoryRuntime::with_files([("/app/lib/index.js", "")]);

        assert!(runtime.metadata(Path::new("/app/lib/index.js")).await.unwrap().is_file);
        assert!(runtime.metadata(Path::new("/app/lib")).await.unwrap().is_dir);
        assert!(runtime.exists(Path::new("/app")));
        assert!(!runtime.exists(Path::new("/app/lib/other.js")));
        assert_eq!(
            runtime.read_file(Path::new("/missing.js")).await.unwrap_err(),
            RuntimeError::FileNotFound(PathBuf::from("/missing.js"))
        );
    }

    #[tokio::test]
    async fn test_memory_runtime_write_then_read() {
        let runtime = MemoryRuntime::new();
        runtime
            .write_file(Path::new("/out/web.js"), b"bundle")
            .await
            .unwrap();
        assert_eq!(runtime.contents(Path::new("/out/web.js")).unwrap(), b"bundle");
        assert_eq!(runtime.paths(), vec![PathBuf::from("/out/web.js")]);
    }
}
