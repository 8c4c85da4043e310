//! Module discovery.
//!
//! Each module's specifiers are resolved concurrently. The graph is locked
//! only for the check-path-or-create step and for storing a populated
//! module, never across an await, so two branches that reach the same file
//! always agree on one [`ModuleId`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::FutureExt;
use futures::future::{BoxFuture, try_join_all};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::{Semaphore, SemaphorePermit};
use tracing::{Instrument, debug, debug_span, info, info_span};

use super::{DependencyGraph, ModuleId, Registration};
use crate::error::{BuildError, DiscoveryError, ResolutionFailure};
use crate::extract::{ExtractError, OxcExtractor, RequireExtractor};
use crate::resolve::{ModuleResolver, ResolveOptions};
use crate::runtime::{Runtime, read_to_string};

/// Options for one build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BuildOptions {
    pub resolve: ResolveOptions,

    /// Upper bound on in-flight resolve and read operations. `None` leaves
    /// the fan-out unbounded.
    pub max_concurrency: Option<usize>,
}

/// Builds a [`DependencyGraph`] from an entry point.
///
/// A builder can run any number of builds; each one owns a fresh graph.
#[derive(Debug, Clone)]
pub struct Builder {
    options: BuildOptions,
    resolver: ModuleResolver,
    runtime: Arc<dyn Runtime>,
    extractor: Arc<dyn RequireExtractor>,
}

impl Builder {
    pub fn new(options: BuildOptions, runtime: Arc<dyn Runtime>) -> Self {
        Self {
            resolver: ModuleResolver::new(options.resolve.clone()),
            options,
            runtime,
            extractor: Arc::new(OxcExtractor::new()),
        }
    }

    /// Swap in a different require extractor.
    pub fn with_extractor(mut self, extractor: Arc<dyn RequireExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// Discover everything reachable from `specifier` in `context`, then
    /// build and finalise the chunk graph.
    ///
    /// Unresolvable specifiers are reported together once every branch has
    /// finished. A malformed require or unparsable module aborts at once.
    pub async fn build(
        &self,
        context: &Path,
        specifier: &str,
    ) -> Result<DependencyGraph, BuildError> {
        let span = info_span!("build", context = %context.display(), specifier);
        async move {
            let session = Discovery {
                builder: self,
                graph: Mutex::new(DependencyGraph::new()),
                permits: self
                    .options
                    .max_concurrency
                    .map(|limit| Semaphore::new(limit.max(1))),
            };

            let entry = session
                .add_module(context.to_path_buf(), specifier.to_string())
                .await?
                .map_err(BuildError::Unresolved)?;

            let mut graph = session.graph.into_inner();
            graph.build_chunks(entry);

            info!(
                modules = graph.module_count(),
                chunks = graph.chunk_count(),
                live_chunks = graph.live_chunks().count(),
                "build finished"
            );
            Ok(graph)
        }
        .instrument(span)
        .await
    }

    /// Build from an entry file path: its directory is the context and
    /// `./<file name>` the specifier.
    pub async fn build_entry(&self, entry: &Path) -> Result<DependencyGraph, BuildError> {
        match (entry.parent(), entry.file_name()) {
            (Some(dir), Some(name)) => {
                let specifier = format!("./{}", name.to_string_lossy());
                self.build(dir, &specifier).await
            }
            _ => self.build(entry, "").await,
        }
    }
}

/// The id of a discovered module, or every failure beneath it.
type Discovered = Result<ModuleId, Vec<ResolutionFailure>>;

/// State of one running build.
struct Discovery<'b> {
    builder: &'b Builder,
    graph: Mutex<DependencyGraph>,
    permits: Option<Semaphore>,
}

impl Discovery<'_> {
    async fn permit(&self) -> Option<SemaphorePermit<'_>> {
        match &self.permits {
            Some(semaphore) => semaphore.acquire().await.ok(),
            None => None,
        }
    }

    fn runtime(&self) -> &dyn Runtime {
        self.builder.runtime.as_ref()
    }

    fn add_module(&self, context: PathBuf, specifier: String) -> BoxFuture<'_, Result<Discovered, BuildError>> {
        let span = debug_span!("discover", specifier = %specifier);
        async move {
            let resolved = {
                let _permit = self.permit().await;
                self.builder
                    .resolver
                    .resolve(&context, &specifier, self.runtime())
                    .await
            };
            let path = match resolved {
                Ok(path) => path,
                Err(err) => return Ok(Err(vec![ResolutionFailure::new(err.into())])),
            };

            let registration = self.graph.lock().register(&path);
            let id = match registration {
                Registration::Existing(id) => return Ok(Ok(id)),
                Registration::New(id) => id,
            };
            debug!(id = %id, path = %path.display(), "discovered module");

            let read = {
                let _permit = self.permit().await;
                read_to_string(self.runtime(), &path).await
            };
            let source = match read {
                Ok(source) => source,
                Err(cause) => {
                    let error = DiscoveryError::ReadFailure { path, cause };
                    return Ok(Err(vec![ResolutionFailure::new(error)]));
                }
            };

            let mut tree = self
                .builder
                .extractor
                .extract(&source)
                .map_err(|err| extraction_failed(&path, err))?;

            let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
            let specifiers: Vec<String> = tree.specifiers().into_iter().map(str::to_string).collect();

            let children = specifiers
                .iter()
                .map(|child| self.add_module(dir.clone(), child.clone()));
            let results = try_join_all(children).await?;

            let mut failures = Vec::new();
            for (child, result) in specifiers.iter().zip(results) {
                match result {
                    Ok(child_id) => tree.assign(child, child_id),
                    Err(child_failures) => {
                        let position = tree.first_position(child);
                        failures.extend(child_failures.into_iter().map(|mut failure| {
                            failure.attach_origin(&path, position);
                            failure
                        }));
                    }
                }
            }

            self.graph.lock().populate(id, source, tree);

            if failures.is_empty() {
                Ok(Ok(id))
            } else {
                Ok(Err(failures))
            }
        }
        .instrument(span)
        .boxed()
    }
}

fn extraction_failed(path: &Path, err: ExtractError) -> BuildError {
    match err {
        ExtractError::MalformedRequire {
            line,
            column,
            reason,
        } => BuildError::MalformedRequire {
            path: path.to_path_buf(),
            line,
            column,
            reason,
        },
        ExtractError::Parse { message } => BuildError::Parse {
            path: path.to_path_buf(),
            message,
        },
    }
}
