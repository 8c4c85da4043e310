//! # splitpack
//!
//! Dependency resolution and code splitting for CommonJS module graphs.
//!
//! Given an entry module, splitpack discovers every module reachable through
//! `require("...")` calls and `require.ensure([...], callback)` async
//! boundaries, gives each module a stable numeric id, partitions the reachable
//! set into chunks along the async boundaries, deduplicates equivalent chunks
//! and finally rewrites every module's source so that textual specifiers
//! become numeric module or chunk ids.
//!
//! ## Architecture
//!
//! ```text
//!   entry ──▶ ModuleResolver ──▶ Runtime::read_file ──▶ RequireExtractor
//!                 ▲                                          │
//!                 └──────────── fan-out per specifier ◀──────┘
//!                                      │
//!                                      ▼
//!                              DependencyGraph (arena)
//!                     chunk construction ─▶ prune ─▶ empty ─▶ alias
//!                                      │
//!                                      ▼
//!                            rewrite::render_module
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use splitpack::{BuildOptions, Builder, NativeRuntime};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let builder = Builder::new(BuildOptions::default(), Arc::new(NativeRuntime::new()));
//! let graph = builder.build(Path::new("/project/src"), "./index").await?;
//!
//! for chunk in graph.live_chunks() {
//!     println!("chunk {} has {} modules", chunk.id, chunk.included().count());
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod extract;
pub mod graph;
pub mod resolve;
pub mod rewrite;
pub mod runtime;

// Platform runtime implementation
pub mod native_runtime;
pub use native_runtime::NativeRuntime;

// Test utilities (available in test builds and when test-utils feature is enabled)
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use error::{BuildError, DiscoveryError, ResolutionFailure};
pub use extract::{
    ByteRange, ExtractError, OxcExtractor, RequireContext, RequireExtractor, RequireSite,
    SourcePosition,
};
pub use graph::{
    BoundaryId, BoundaryRecord, BuildOptions, Builder, ChunkId, ChunkOrigin, ChunkRecord,
    DependencyGraph, Membership, ModuleId, ModuleRecord,
};
pub use resolve::{ModuleResolver, ResolveError, ResolveOptions};
pub use rewrite::{render_module, render_modules};
pub use runtime::{FileMetadata, Runtime, RuntimeError, RuntimeResult};
