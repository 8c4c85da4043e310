//! Minimal package.json reading for directory resolution.

use serde::Deserialize;
use std::path::Path;

use crate::runtime::{Runtime, RuntimeError, read_to_string};

/// Maximum allowed size for package.json files (10MB)
const MAX_PACKAGE_JSON_SIZE: u64 = 10 * 1024 * 1024;

/// The subset of package.json the resolver cares about.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageJson {
    /// Entry file relative to the package directory
    #[serde(default)]
    pub main: Option<String>,
}

/// Errors raised while loading a package manifest.
#[derive(Debug, thiserror::Error)]
pub enum PackageJsonError {
    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error("package.json exceeds maximum size of {}MB", MAX_PACKAGE_JSON_SIZE / 1024 / 1024)]
    TooLarge,

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl PackageJson {
    /// Load and parse a manifest through the runtime.
    pub async fn from_path(runtime: &dyn Runtime, path: &Path) -> Result<Self, PackageJsonError> {
        let metadata = runtime.metadata(path).await?;
        if metadata.size > MAX_PACKAGE_JSON_SIZE {
            return Err(PackageJsonError::TooLarge);
        }

        let content = read_to_string(runtime, path).await?;
        Ok(serde_json::from_str(&content)?)
    }

    /// The `main` entry, falling back to `index` when unset or empty.
    pub fn main_or_index(&self) -> &str {
        match self.main.as_deref() {
            Some(main) if !main.is_empty() => main,
            _ => "index",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_main_defaults_to_index() {
        let pkg: PackageJson = serde_json::from_str(r#"{"name": "pkg"}"#).unwrap();
        assert_eq!(pkg.main_or_index(), "index");

        let pkg: PackageJson = serde_json::from_str(r#"{"main": ""}"#).unwrap();
        assert_eq!(pkg.main_or_index(), "index");
    }

    #[test]
    fn test_main_field_is_used() {
        let pkg: PackageJson =
            serde_json::from_str(r#"{"name": "z", "main": "lib/m", "version": "1.0.0"}"#).unwrap();
        assert_eq!(pkg.main_or_index(), "lib/m");
    }
}
