//! Runtime preambles and module wrappers.

use splitpack::{ChunkId, DependencyGraph, ModuleId, render_modules};

/// Module-map runtime for a bundle with no lazily loaded chunks.
pub(crate) const SINGLE_PREAMBLE: &str = include_str!("templates/single.js");

/// Module-map runtime that loads further chunks through a JSONP callback.
/// Reads `a` (file postfix), `b` (callback name) and `c` (script prefix)
/// from the module map it is invoked with.
pub(crate) const ASYNC_PREAMBLE: &str = include_str!("templates/async.js");

/// Quote `value` as a JavaScript string literal.
pub(crate) fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_owned()).to_string()
}

/// Append one `id: function(module, exports, require) {...}` entry.
fn write_module(buffer: &mut String, id: ModuleId, path: Option<&str>, source: &str) {
    buffer.push_str("/******/\n");
    buffer.push_str(&id.to_string());
    buffer.push_str(": function(module, exports, require) {\n\n");
    if let Some(path) = path {
        buffer.push_str("/*** ");
        buffer.push_str(path);
        buffer.push_str(" ***/\n\n");
    }
    buffer.push_str(source);
    buffer.push_str("\n\n/******/},\n");
}

/// Rewrite and wrap the modules of `chunk`, or of the whole graph when
/// `chunk` is `None`, in ascending id order.
pub(crate) fn write_modules(
    buffer: &mut String,
    graph: &DependencyGraph,
    chunk: Option<ChunkId>,
    include_filenames: bool,
) {
    for (id, source) in render_modules(graph, chunk) {
        let path = include_filenames
            .then(|| graph.module(id))
            .flatten()
            .map(|module| module.path.display().to_string());
        write_module(buffer, id, path.as_deref(), &source);
    }
}
