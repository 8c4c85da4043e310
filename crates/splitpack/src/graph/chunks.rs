//! Chunk construction and finalisation.
//!
//! Runs once discovery has finished. Construction walks sync edges from the
//! entry and opens a new chunk at every async boundary it has not seen yet.
//! Finalisation then visits chunks in ascending id order and, for each one,
//! prunes modules its direct parents already list, marks it empty if
//! nothing is left and collapses it onto an earlier chunk with the same
//! in-parent key.

use tracing::{debug, warn};

use super::{ChunkId, ChunkOrigin, ChunkRecord, DependencyGraph, Membership, ModuleId};

impl DependencyGraph {
    /// Build and finalise every chunk, starting with chunk 0 at `entry`.
    pub(crate) fn build_chunks(&mut self, entry: ModuleId) {
        self.entry = Some(entry);
        self.add_chunk(ChunkOrigin::Module(entry));

        for index in 0..self.chunks.len() {
            let id = ChunkId::new(index as u32);
            self.prune_parent_modules(id);
            self.mark_if_empty(id);
            self.collapse_equivalent(id);
        }
    }

    fn add_chunk(&mut self, origin: ChunkOrigin) -> ChunkId {
        let id = ChunkId::new(self.chunks.len() as u32);
        self.chunks.push(ChunkRecord::new(id, origin));
        self.set_origin_chunk(origin, Some(id));
        debug!(chunk = %id, ?origin, "created chunk");

        self.add_to_chunk(origin, id);
        id
    }

    /// Add `node` and everything it synchronously reaches to `chunk`.
    ///
    /// Returns early when `node` is already a member, which terminates
    /// require cycles.
    fn add_to_chunk(&mut self, node: ChunkOrigin, chunk: ChunkId) {
        let (edges, boundaries) = match node {
            ChunkOrigin::Module(id) => {
                let Some(module) = self.modules.get_mut(id.index()) else {
                    return;
                };
                if !module.chunk_memberships.insert(chunk) {
                    return;
                }
                let edges: Vec<_> = module
                    .requires
                    .iter()
                    .map(|site| (site.specifier.clone(), site.resolved))
                    .collect();
                let boundaries = module.boundaries.clone();
                self.chunks[chunk.index()]
                    .modules
                    .insert(id, Membership::Include);
                (edges, boundaries)
            }
            ChunkOrigin::Boundary(id) => {
                let Some(boundary) = self.boundaries.get_mut(id.index()) else {
                    return;
                };
                if !boundary.chunk_memberships.insert(chunk) {
                    return;
                }
                let edges: Vec<_> = boundary
                    .requires
                    .iter()
                    .map(|site| (site.specifier.clone(), site.resolved))
                    .collect();
                (edges, boundary.boundaries.clone())
            }
        };

        for (specifier, resolved) in edges {
            match resolved {
                Some(target) => self.add_to_chunk(ChunkOrigin::Module(target), chunk),
                None => warn!(chunk = %chunk, specifier = %specifier, "skipping unresolved require"),
            }
        }

        for boundary in boundaries {
            let existing = self.boundaries[boundary.index()].chunk;
            let sub_chunk = match existing {
                Some(sub_chunk) => sub_chunk,
                None => self.add_chunk(ChunkOrigin::Boundary(boundary)),
            };
            self.chunks[sub_chunk.index()].parents.insert(chunk);
        }
    }

    fn set_origin_chunk(&mut self, origin: ChunkOrigin, chunk: Option<ChunkId>) {
        match origin {
            ChunkOrigin::Module(id) => {
                if let Some(module) = self.modules.get_mut(id.index()) {
                    module.origin_chunk = chunk;
                }
            }
            ChunkOrigin::Boundary(id) => {
                if let Some(boundary) = self.boundaries.get_mut(id.index()) {
                    boundary.chunk = chunk;
                }
            }
        }
    }

    /// Flip to `in-parent` every included module that a direct parent lists
    /// in either state. Grandparents are not consulted.
    fn prune_parent_modules(&mut self, id: ChunkId) {
        let chunk = &self.chunks[id.index()];
        if chunk.parents.is_empty() {
            return;
        }

        let pruned: Vec<ModuleId> = chunk
            .included()
            .filter(|module| {
                chunk.parents.iter().any(|parent| {
                    self.chunks[parent.index()].membership(*module).is_some()
                })
            })
            .collect();

        if pruned.is_empty() {
            return;
        }
        debug!(chunk = %id, pruned = pruned.len(), "pruned modules provided by parents");

        let chunk = &mut self.chunks[id.index()];
        for module in pruned {
            chunk.modules.insert(module, Membership::InParent);
        }
    }

    fn mark_if_empty(&mut self, id: ChunkId) {
        let chunk = &mut self.chunks[id.index()];
        if chunk.included().next().is_some() {
            return;
        }

        chunk.empty = true;
        let origin = chunk.origin;
        self.set_origin_chunk(origin, None);
        debug!(chunk = %id, "chunk is empty");
    }

    /// Alias this chunk to the first chunk with an identical, non-empty
    /// in-parent key.
    fn collapse_equivalent(&mut self, id: ChunkId) {
        let Some(key) = self.canonical_key(id) else {
            return;
        };
        if key.is_empty() {
            return;
        }

        let existing = self.canonical_keys.get(&key).copied();
        match existing {
            Some(earlier) => {
                let chunk = &mut self.chunks[id.index()];
                chunk.alias_of = Some(earlier);
                let origin = chunk.origin;
                self.set_origin_chunk(origin, Some(earlier));
                debug!(chunk = %id, alias_of = %earlier, "collapsed equivalent chunk");
            }
            None => {
                self.canonical_keys.insert(key, id);
            }
        }
    }

    /// Canonical key of a chunk: its in-parent module ids, ascending,
    /// joined by spaces.
    pub fn canonical_key(&self, id: ChunkId) -> Option<String> {
        let chunk = self.chunk(id)?;
        let ids: Vec<String> = chunk.in_parent().map(|module| module.to_string()).collect();
        Some(ids.join(" "))
    }
}
