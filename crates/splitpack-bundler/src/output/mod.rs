//! Rendering a finished [`DependencyGraph`] into JavaScript files.
//!
//! Single mode dumps every module into one self-starting module map. Split
//! mode emits one file per live chunk: the entry chunk carries the runtime,
//! every other chunk registers its modules through the JSONP callback.

mod stats;
mod template;
pub mod writer;

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;
use splitpack::{ChunkId, DependencyGraph};
use tracing::debug;

use crate::Result;
use crate::options::OutputOptions;
use template::{ASYNC_PREAMBLE, SINGLE_PREAMBLE, js_string, write_modules};

pub use stats::BundleStats;
pub use writer::write_bundle;

/// One emitted file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputFile {
    pub chunk: ChunkId,
    pub path: PathBuf,
    pub contents: String,
}

/// Every file of a split build plus its statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BundleOutput {
    /// Directory every file is written beneath.
    pub directory: PathBuf,
    pub files: Vec<OutputFile>,
    pub stats: BundleStats,
}

fn write_library_prefix(buffer: &mut String, options: &OutputOptions) {
    if let Some(library) = &options.library {
        buffer.push_str("var ");
        buffer.push_str(library);
        buffer.push('=');
    }
}

/// Render every module of `graph` into one script.
pub fn render_single(graph: &DependencyGraph, options: &OutputOptions) -> String {
    let mut buffer = String::new();
    write_library_prefix(&mut buffer, options);
    buffer.push_str(SINGLE_PREAMBLE);
    buffer.push_str("({\n");
    write_modules(&mut buffer, graph, None, options.include_filenames);
    buffer.push_str("/******/})\n");
    buffer
}

/// Render one file per live chunk.
///
/// Empty chunks and chunks aliased to an earlier one produce no file; the
/// rewriter already points their boundaries elsewhere.
pub fn render_chunks(graph: &DependencyGraph, options: &OutputOptions) -> Result<BundleOutput> {
    let layout = options.layout()?;
    let split = graph.live_chunks().count() > 1;

    let mut files = Vec::new();
    let mut file_sizes = BTreeMap::new();

    for chunk in graph.live_chunks() {
        let mut buffer = String::new();

        if chunk.id == ChunkId::ENTRY {
            write_library_prefix(&mut buffer, options);
            if split {
                buffer.push_str(ASYNC_PREAMBLE);
                buffer.push_str("({\n");
                buffer.push_str(&format!(
                    "a: {},\nb: {},\nc: {},\n",
                    js_string(&layout.postfix),
                    js_string(&layout.jsonp_function),
                    js_string(&layout.script_src_prefix),
                ));
            } else {
                buffer.push_str(SINGLE_PREAMBLE);
                buffer.push_str("({\n");
            }
        } else {
            buffer.push_str(&format!("/******/{}({}, {{\n", layout.jsonp_function, chunk.id));
        }

        write_modules(&mut buffer, graph, Some(chunk.id), options.include_filenames);
        buffer.push_str("/******/})");
        if chunk.id == ChunkId::ENTRY {
            buffer.push('\n');
        } else {
            buffer.push_str(";\n");
        }

        let path = layout.chunk_path(chunk.id.0);
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        debug!(chunk = %chunk.id, file = %name, size = buffer.len(), "rendered chunk");

        file_sizes.insert(name, buffer.len());
        files.push(OutputFile {
            chunk: chunk.id,
            path,
            contents: buffer,
        });
    }

    Ok(BundleOutput {
        directory: layout.directory,
        stats: BundleStats::collect(graph, file_sizes),
        files,
    })
}
