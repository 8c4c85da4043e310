//! Error types for the splitpack CLI.
//!
//! Library errors convert into [`CliError`] through `#[from]`; `main` turns
//! the final error into a miette report.

use std::path::PathBuf;
use thiserror::Error;

use miette::Report;
use splitpack_bundler::{BuildError, DiscoveryError};

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The module graph could not be built
    #[error(transparent)]
    Build(#[from] BuildError),

    /// Rendering or writing the bundle failed
    #[error(transparent)]
    Bundle(#[from] splitpack_bundler::Error),

    /// Entry module doesn't exist
    #[error("Entry module not found: {}", .0.display())]
    EntryNotFound(PathBuf),

    /// I/O errors outside the bundler
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Options file doesn't exist
    #[error("Options file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// A layer held a value of the wrong shape
    #[error("{0}")]
    Invalid(String),
}

/// Result type alias using `CliError` as the default error type.
pub type Result<T, E = CliError> = std::result::Result<T, E>;

/// Convert a [`CliError`] into a miette report with a hint where one helps.
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Build(e) => build_error_to_miette(e),
        CliError::Bundle(splitpack_bundler::Error::Build(e)) => build_error_to_miette(e),
        CliError::EntryNotFound(path) => miette::miette!(
            "Entry module not found: {}\n\nHint: Check the INPUT argument",
            path.display()
        ),
        CliError::Config(ConfigError::NotFound(path)) => miette::miette!(
            "Options file not found: {}\n\nHint: Check the --options argument",
            path.display()
        ),
        other => miette::miette!("{}", other),
    }
}

fn build_error_to_miette(err: BuildError) -> Report {
    match &err {
        BuildError::Unresolved(failures) => {
            let packages = failures.iter().any(|failure| {
                matches!(&failure.error, DiscoveryError::ModuleNotFound { specifier, .. }
                    if !specifier.starts_with('.') && !specifier.starts_with('/'))
            });
            if packages {
                miette::miette!(
                    "{}\n\nHint: Install missing packages into node_modules or add a directory with --paths",
                    err
                )
            } else {
                miette::miette!("{}", err)
            }
        }
        BuildError::MalformedRequire { .. } => miette::miette!(
            "{}\n\nHint: require() and require.ensure() only accept string literals",
            err
        ),
        BuildError::Parse { .. } => miette::miette!("{}", err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use splitpack_bundler::ResolutionFailure;

    fn not_found(specifier: &str) -> BuildError {
        BuildError::Unresolved(vec![ResolutionFailure::new(DiscoveryError::ModuleNotFound {
            context: PathBuf::from("/app"),
            specifier: specifier.to_string(),
        })])
    }

    #[test]
    fn test_missing_package_gets_hint() {
        let report = cli_error_to_miette(CliError::Build(not_found("left-pad")));
        let msg = report.to_string();
        assert!(msg.contains("left-pad"));
        assert!(msg.contains("Hint: Install missing packages"));
    }

    #[test]
    fn test_missing_relative_module_has_no_package_hint() {
        let report = cli_error_to_miette(CliError::Build(not_found("./gone")));
        assert!(!report.to_string().contains("Hint"));
    }

    #[test]
    fn test_malformed_require_hint() {
        let err = BuildError::MalformedRequire {
            path: PathBuf::from("/app/index.js"),
            line: 3,
            column: 4,
            reason: "sync require must be a string".to_string(),
        };
        let msg = cli_error_to_miette(CliError::Build(err)).to_string();
        assert!(msg.contains("string literals"));
    }

    #[test]
    fn test_bundle_build_errors_unwrap() {
        let err = CliError::Bundle(splitpack_bundler::Error::Build(not_found("left-pad")));
        assert!(cli_error_to_miette(err).to_string().contains("Hint:"));
    }

    #[test]
    fn test_cli_error_from_config_error() {
        let err: CliError = ConfigError::NotFound(PathBuf::from("opts.json")).into();
        assert!(matches!(err, CliError::Config(_)));
        assert!(err.to_string().contains("opts.json"));
    }
}
