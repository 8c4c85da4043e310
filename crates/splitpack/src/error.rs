//! Build error types.
//!
//! Resolution and read failures are collected per build and reported
//! together as [`BuildError::Unresolved`]. Extraction failures abort the
//! build immediately.

use std::fmt;
use std::path::PathBuf;

use crate::extract::SourcePosition;
use crate::resolve::ResolveError;
use crate::runtime::RuntimeError;

/// Failure to bring one specifier into the graph.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiscoveryError {
    #[error("Module \"{specifier}\" not found in \"{}\"", context.display())]
    ModuleNotFound { context: PathBuf, specifier: String },

    #[error("Failed to read {}: {cause}", path.display())]
    ReadFailure {
        path: PathBuf,
        #[source]
        cause: RuntimeError,
    },
}

impl From<ResolveError> for DiscoveryError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::ModuleNotFound { context, specifier } => {
                DiscoveryError::ModuleNotFound { context, specifier }
            }
        }
    }
}

/// A [`DiscoveryError`] plus where the failing require was written.
///
/// `origin` and `position` are `None` only for the entry module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionFailure {
    pub error: DiscoveryError,
    pub origin: Option<PathBuf>,
    pub position: Option<SourcePosition>,
}

impl ResolutionFailure {
    pub fn new(error: DiscoveryError) -> Self {
        Self {
            error,
            origin: None,
            position: None,
        }
    }

    /// Record the requiring file, unless a closer origin is already known.
    pub fn attach_origin(&mut self, origin: &std::path::Path, position: Option<SourcePosition>) {
        if self.origin.is_none() {
            self.origin = Some(origin.to_path_buf());
            self.position = position;
        }
    }
}

impl fmt::Display for ResolutionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;
        if let Some(origin) = &self.origin {
            write!(f, "\n @ {}", origin.display())?;
            if let Some(position) = self.position {
                write!(f, ":{}", position)?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for ResolutionFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Top-level build failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    /// Every specifier that failed to resolve or read.
    #[error("{}", render_failures(.0))]
    Unresolved(Vec<ResolutionFailure>),

    #[error("{}: line {line}, column {column}: {reason}", path.display())]
    MalformedRequire {
        path: PathBuf,
        line: u32,
        column: u32,
        reason: String,
    },

    #[error("Failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },
}

impl BuildError {
    /// Failures carried by an `Unresolved` error, empty otherwise.
    pub fn failures(&self) -> &[ResolutionFailure] {
        match self {
            BuildError::Unresolved(failures) => failures,
            _ => &[],
        }
    }
}

fn render_failures(failures: &[ResolutionFailure]) -> String {
    let mut out = format!("{} module(s) could not be resolved", failures.len());
    for failure in failures {
        out.push('\n');
        out.push_str(&failure.to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn not_found(specifier: &str) -> ResolutionFailure {
        ResolutionFailure::new(DiscoveryError::ModuleNotFound {
            context: PathBuf::from("/app"),
            specifier: specifier.to_string(),
        })
    }

    #[test]
    fn test_attach_origin_keeps_nearest() {
        let mut failure = not_found("./gone");
        failure.attach_origin(
            Path::new("/app/a.js"),
            Some(SourcePosition { line: 3, column: 4 }),
        );
        failure.attach_origin(Path::new("/app/index.js"), None);

        assert_eq!(failure.origin.as_deref(), Some(Path::new("/app/a.js")));
        assert_eq!(
            failure.to_string(),
            "Module \"./gone\" not found in \"/app\"\n @ /app/a.js:3:4"
        );
    }

    #[test]
    fn test_unresolved_lists_every_failure() {
        let err = BuildError::Unresolved(vec![not_found("./x"), not_found("./y")]);
        let message = err.to_string();

        assert!(message.starts_with("2 module(s) could not be resolved"));
        assert!(message.contains("\"./x\""));
        assert!(message.contains("\"./y\""));
        assert_eq!(err.failures().len(), 2);
    }

    #[test]
    fn test_resolve_error_converts() {
        let err: DiscoveryError = ResolveError::ModuleNotFound {
            context: PathBuf::from("/d"),
            specifier: "pkg".into(),
        }
        .into();
        assert!(matches!(err, DiscoveryError::ModuleNotFound { .. }));
    }
}
