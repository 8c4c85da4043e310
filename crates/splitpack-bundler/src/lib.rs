#![cfg_attr(docsrs, feature(doc_cfg))]

//! # splitpack-bundler
//!
//! Turns a finished splitpack [`DependencyGraph`] into JavaScript: a
//! self-starting single file, or one file per chunk with a JSONP loader in
//! the entry chunk.
//!
//! ## Quick Start
//!
//! ```no_run
//! use splitpack_bundler::{BuildOptions, Builder, NativeRuntime, OutputOptions};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let runtime = Arc::new(NativeRuntime::new());
//! let builder = Builder::new(BuildOptions::default(), runtime.clone());
//! let options = OutputOptions::split("dist/web.js");
//!
//! let output = splitpack_bundler::bundle(&builder, Path::new("src/index.js"), &options).await?;
//! splitpack_bundler::write_bundle(&output, runtime.as_ref()).await?;
//! println!("{}", output.stats);
//! # Ok(()) }
//! ```

use std::path::Path;

// Re-export everything from the core crate
pub use splitpack::*;

pub mod options;
pub mod output;

pub use options::{OutputOptions, SplitLayout};
pub use output::writer::write_single;
pub use output::{BundleOutput, BundleStats, OutputFile, render_chunks, render_single, write_bundle};

// Logging utilities (optional, enabled with "logging" feature)
#[cfg(feature = "logging")]
#[cfg_attr(docsrs, doc(cfg(feature = "logging")))]
pub mod logging;

#[cfg(feature = "logging")]
#[cfg_attr(docsrs, doc(cfg(feature = "logging")))]
pub use logging::{LogLevel, init_logging, init_logging_from_env};

/// Build the graph for `entry` and render it into split output.
///
/// Nothing is written; pass the result to [`write_bundle`].
pub async fn bundle(builder: &Builder, entry: &Path, options: &OutputOptions) -> Result<BundleOutput> {
    let graph = builder.build_entry(entry).await?;
    render_chunks(&graph, options)
}

/// Build the graph for `entry` and render every module into one script.
pub async fn bundle_single(
    builder: &Builder,
    entry: &Path,
    options: &OutputOptions,
) -> Result<String> {
    let graph = builder.build_entry(entry).await?;
    Ok(render_single(&graph, options))
}

/// Errors from bundling and writing output.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The module graph could not be built.
    #[error(transparent)]
    Build(#[from] BuildError),

    /// Runtime operation failed
    #[error("Runtime error: {0}")]
    Runtime(#[from] RuntimeError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid output path (e.g., path traversal attempt)
    #[error("Invalid output path: {0}")]
    InvalidOutputPath(String),

    /// Write operation failed
    #[error("Write failed: {0}")]
    WriteFailure(String),
}

pub type Result<T> = std::result::Result<T, Error>;
