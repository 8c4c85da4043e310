//! Source rewriting.
//!
//! Splices resolved ids into a module's source text. Sync require
//! literals become module ids and `require.ensure` preload literals become
//! chunk ids. Edits are applied back to front so earlier offsets stay valid.

use std::collections::BTreeMap;

use tracing::warn;

use crate::extract::{ByteRange, RequireSite};
use crate::graph::{BoundaryId, ChunkId, DependencyGraph, Membership, ModuleId, ModuleRecord};

struct Replacement {
    range: ByteRange,
    value: String,
}

fn collect_sites(sites: &[RequireSite], out: &mut Vec<Replacement>) {
    for site in sites {
        if let (Some(range), Some(id)) = (site.range, site.resolved) {
            out.push(Replacement {
                range,
                value: id.to_string(),
            });
        }
    }
}

fn collect_boundary(graph: &DependencyGraph, id: BoundaryId, out: &mut Vec<Replacement>) {
    let Some(boundary) = graph.boundary(id) else {
        return;
    };

    collect_sites(&boundary.requires, out);
    for nested in &boundary.boundaries {
        collect_boundary(graph, *nested, out);
    }
    if let Some(range) = boundary.preload_range {
        out.push(Replacement {
            range,
            value: graph.boundary_target(id).to_string(),
        });
    }
}

/// Render one module's source with every require site replaced by its
/// numeric id.
pub fn render_module(graph: &DependencyGraph, module: &ModuleRecord) -> String {
    let mut replacements = Vec::new();
    collect_sites(&module.requires, &mut replacements);
    for boundary in &module.boundaries {
        collect_boundary(graph, *boundary, &mut replacements);
    }

    if replacements.is_empty() {
        return module.source.clone();
    }

    replacements.sort_by(|a, b| b.range.start.cmp(&a.range.start));

    let mut source = module.source.clone();
    for replacement in replacements {
        let start = replacement.range.start as usize;
        let end = replacement.range.end as usize;
        if end > source.len()
            || start > end
            || !source.is_char_boundary(start)
            || !source.is_char_boundary(end)
        {
            warn!(
                module = %module.id,
                start,
                end,
                "require range outside source, left as written"
            );
            continue;
        }
        source.replace_range(start..end, &replacement.value);
    }
    source
}

/// Render a set of modules keyed by id.
///
/// With `chunk`, only modules included in that chunk are rendered. Without
/// one, every module in the graph is.
pub fn render_modules(
    graph: &DependencyGraph,
    chunk: Option<ChunkId>,
) -> BTreeMap<ModuleId, String> {
    match chunk {
        Some(chunk) => graph
            .chunk(chunk)
            .into_iter()
            .flat_map(|record| record.modules.iter())
            .filter(|(_, membership)| **membership == Membership::Include)
            .filter_map(|(id, _)| graph.module(*id))
            .map(|module| (module.id, render_module(graph, module)))
            .collect(),
        None => graph
            .modules()
            .map(|module| (module.id, render_module(graph, module)))
            .collect(),
    }
}
