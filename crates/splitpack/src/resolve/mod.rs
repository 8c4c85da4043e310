//! Node-style module resolution.
//!
//! Relative specifiers (`./x`, `../x`, absolute paths and the empty string)
//! are joined to the context directory and resolved as a file, then as a
//! directory. Bare specifiers are looked up under a list of candidate
//! `node_modules` roots: the configured extra paths first, then every
//! ancestor of the context directory, nearest first.
//!
//! Only stat probes touch the filesystem, apart from one `package.json` read
//! per directory attempt. Nothing is cached here; the graph builder
//! deduplicates by resolved path.

mod package_json;


pub use package_json::{PackageJson, PackageJsonError};

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use path_clean::PathClean;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::runtime::{Runtime, is_file};

const NODE_MODULES: &str = "node_modules";

/// Resolution options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResolveOptions {
    /// Suffixes tried, in order, after the exact path during file resolution.
    pub extensions: Vec<String>,

    /// Extra `node_modules`-style roots searched before the ancestor walk.
    pub paths: Vec<PathBuf>,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            extensions: vec![".js".to_string()],
            paths: Vec::new(),
        }
    }
}

/// Resolution failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// Every candidate was exhausted.
    #[error("Module \"{specifier}\" not found in \"{}\"", context.display())]
    ModuleNotFound { context: PathBuf, specifier: String },
}

/// Resolves `(context directory, specifier)` pairs to absolute file paths.
#[derive(Debug, Clone, Default)]
pub struct ModuleResolver {
    options: ResolveOptions,
}

impl ModuleResolver {
    pub fn new(options: ResolveOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ResolveOptions {
        &self.options
    }

    /// Resolve `specifier` relative to the directory `context`.
    pub async fn resolve(
        &self,
        context: &Path,
        specifier: &str,
        runtime: &dyn Runtime,
    ) -> Result<PathBuf, ResolveError> {
        let resolved = if is_relative(specifier) {
            let candidate = context.join(specifier).clean();
            self.resolve_path(&candidate, runtime).await
        } else {
            self.resolve_bare(context, specifier, runtime).await
        };

        match resolved {
            Some(path) => {
                trace!(specifier, path = %path.display(), "resolved");
                Ok(path)
            }
            None => Err(ResolveError::ModuleNotFound {
                context: context.to_path_buf(),
                specifier: specifier.to_string(),
            }),
        }
    }

    /// Candidate `node_modules` roots for a bare specifier, in search order.
    ///
    /// Ancestors that are themselves named `node_modules` do not produce a
    /// nested `node_modules/node_modules` candidate.
    pub fn candidate_roots(&self, context: &Path) -> Vec<PathBuf> {
        let mut roots = self.options.paths.clone();
        for dir in context.ancestors() {
            if dir.file_name() == Some(OsStr::new(NODE_MODULES)) {
                continue;
            }
            roots.push(dir.join(NODE_MODULES));
        }
        roots
    }

    async fn resolve_bare(
        &self,
        context: &Path,
        specifier: &str,
        runtime: &dyn Runtime,
    ) -> Option<PathBuf> {
        for root in self.candidate_roots(context) {
            let candidate = specifier
                .split(['/', '\\'])
                .filter(|segment| !segment.is_empty())
                .fold(root, |path, segment| path.join(segment))
                .clean();

            if let Some(found) = self.resolve_path(&candidate, runtime).await {
                return Some(found);
            }
        }
        None
    }

    async fn resolve_path(&self, path: &Path, runtime: &dyn Runtime) -> Option<PathBuf> {
        if let Some(file) = self.resolve_as_file(path, runtime).await {
            return Some(file);
        }
        self.resolve_as_directory(path, runtime).await
    }

    /// Exact path first, then each configured extension appended in order.
    async fn resolve_as_file(&self, path: &Path, runtime: &dyn Runtime) -> Option<PathBuf> {
        if is_file(runtime, path).await {
            return Some(path.to_path_buf());
        }

        for extension in &self.options.extensions {
            let mut candidate = path.as_os_str().to_os_string();
            candidate.push(extension);
            let candidate = PathBuf::from(candidate);
            if is_file(runtime, &candidate).await {
                return Some(candidate);
            }
        }

        None
    }

    async fn resolve_as_directory(&self, dir: &Path, runtime: &dyn Runtime) -> Option<PathBuf> {
        let manifest = dir.join("package.json");

        let main = if is_file(runtime, &manifest).await {
            match PackageJson::from_path(runtime, &manifest).await {
                Ok(pkg) => pkg.main_or_index().to_string(),
                Err(err) => {
                    debug!(manifest = %manifest.display(), %err, "unreadable package.json");
                    return None;
                }
            }
        } else {
            "index".to_string()
        };

        self.resolve_as_file(&dir.join(main).clean(), runtime).await
    }
}

/// `.`, `..` or empty first segment (which also covers absolute paths).
fn is_relative(specifier: &str) -> bool {
    matches!(specifier.split(['/', '\\']).next(), Some("" | "." | ".."))
}
