//! Platform runtime abstraction.
//!
//! The `Runtime` trait is the source reader (and, for the bundler, the file
//! writer) collaborator. The graph builder and resolver never touch `std::fs`
//! directly, which keeps them testable against in-memory file systems.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Result type for runtime operations
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Errors that can occur during runtime operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuntimeError {
    /// File not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(String),

    /// File content is not valid UTF-8
    #[error("Invalid UTF-8 in {}: {reason}", path.display())]
    InvalidUtf8 { path: PathBuf, reason: String },

    /// Other runtime error
    #[error("Runtime error: {0}")]
    Other(String),
}

/// File metadata
#[derive(Debug, Clone)]
pub struct FileMetadata {
    /// File size in bytes
    pub size: u64,
    /// Whether this is a directory
    pub is_dir: bool,
    /// Whether this is a regular file
    pub is_file: bool,
    /// Last modified timestamp (milliseconds since epoch)
    pub modified: Option<u64>,
}

/// Platform runtime trait
///
/// Implementations provide file reads, stat probes and writes. Every method
/// is safe to call concurrently; the builder fans out many probes at once.
#[async_trait]
pub trait Runtime: Send + Sync + std::fmt::Debug {
    /// Read a file from the filesystem
    async fn read_file(&self, path: &Path) -> RuntimeResult<Vec<u8>>;

    /// Write a file to the filesystem
    async fn write_file(&self, path: &Path, content: &[u8]) -> RuntimeResult<()>;

    /// Get file metadata
    async fn metadata(&self, path: &Path) -> RuntimeResult<FileMetadata>;

    /// Check if a path exists
    fn exists(&self, path: &Path) -> bool;

    /// Create a directory
    async fn create_dir(&self, path: &Path, recursive: bool) -> RuntimeResult<()>;
}

/// Read a file and decode it as UTF-8.
pub async fn read_to_string(runtime: &dyn Runtime, path: &Path) -> RuntimeResult<String> {
    let bytes = runtime.read_file(path).await?;
    String::from_utf8(bytes).map_err(|e| RuntimeError::InvalidUtf8 {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Returns `true` when `path` exists and is a regular file.
///
/// Any probe error counts as "not a file"; resolution treats missing and
/// unreadable candidates the same way.
pub async fn is_file(runtime: &dyn Runtime, path: &Path) -> bool {
    runtime
        .metadata(path)
        .await
        .map(|meta| meta.is_file)
        .unwrap_or(false)
}
