//! The dependency graph arena.
//!
//! Modules, async-boundary contexts and chunks live in flat vectors indexed
//! by [`ModuleId`], [`BoundaryId`] and [`ChunkId`]. Every cross reference
//! (require edges, nested boundaries, chunk parents, memberships) is one of
//! those ids, so collapsing a chunk into an alias never leaves anything
//! dangling.

mod builder;
mod chunks;
mod ids;


pub use builder::{BuildOptions, Builder};
pub use ids::{BoundaryId, ChunkId, ModuleId};

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::extract::{ByteRange, RequireContext, RequireSite, SourcePosition};

/// One module per unique absolute path.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleRecord {
    pub id: ModuleId,
    pub path: PathBuf,

    /// Source exactly as read. Empty until the module is populated.
    #[serde(skip)]
    pub source: String,

    /// Sync edges of the module scope.
    pub requires: Vec<RequireSite>,

    /// Top-level async boundaries, in source order.
    pub boundaries: Vec<BoundaryId>,

    /// Chunks this module was added to during chunk construction.
    pub chunk_memberships: BTreeSet<ChunkId>,

    /// Set when this module roots a chunk (the entry roots chunk 0).
    pub origin_chunk: Option<ChunkId>,
}

impl ModuleRecord {
    fn new(id: ModuleId, path: PathBuf) -> Self {
        Self {
            id,
            path,
            source: String::new(),
            requires: Vec::new(),
            boundaries: Vec::new(),
            chunk_memberships: BTreeSet::new(),
            origin_chunk: None,
        }
    }
}

/// A `require.ensure` context, flattened out of its module's require tree.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundaryRecord {
    pub id: BoundaryId,

    /// Module whose source contains this boundary.
    pub module: ModuleId,

    /// Enclosing boundary, `None` when directly in the module scope.
    pub parent: Option<BoundaryId>,

    /// Preload specifiers followed by the sync edges of the callback body.
    pub requires: Vec<RequireSite>,

    /// Nested boundaries.
    pub boundaries: Vec<BoundaryId>,

    pub preload_range: Option<ByteRange>,
    pub position: Option<SourcePosition>,

    /// Chunk rooted at this boundary. Cleared when the chunk turns out empty,
    /// redirected when it is collapsed into an earlier equivalent chunk.
    pub chunk: Option<ChunkId>,

    pub chunk_memberships: BTreeSet<ChunkId>,
}

/// What a chunk is rooted at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChunkOrigin {
    Module(ModuleId),
    Boundary(BoundaryId),
}

/// A module's status within one chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Membership {
    /// Emitted as part of the chunk.
    Include,
    /// Already provided by a direct parent chunk.
    InParent,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkRecord {
    pub id: ChunkId,
    pub origin: ChunkOrigin,
    pub modules: BTreeMap<ModuleId, Membership>,

    /// Chunks that reach this chunk's origin through an async boundary.
    pub parents: BTreeSet<ChunkId>,

    /// No `include` entries are left after parent pruning.
    pub empty: bool,

    /// Earlier chunk with the same in-parent key. Never cleared once set.
    pub alias_of: Option<ChunkId>,
}

impl ChunkRecord {
    fn new(id: ChunkId, origin: ChunkOrigin) -> Self {
        Self {
            id,
            origin,
            modules: BTreeMap::new(),
            parents: BTreeSet::new(),
            empty: false,
            alias_of: None,
        }
    }

    /// Modules emitted with this chunk, ascending by id.
    pub fn included(&self) -> impl Iterator<Item = ModuleId> + '_ {
        self.with_membership(Membership::Include)
    }

    /// Modules pruned because a direct parent already provides them.
    pub fn in_parent(&self) -> impl Iterator<Item = ModuleId> + '_ {
        self.with_membership(Membership::InParent)
    }

    fn with_membership(&self, wanted: Membership) -> impl Iterator<Item = ModuleId> + '_ {
        self.modules
            .iter()
            .filter(move |(_, membership)| **membership == wanted)
            .map(|(id, _)| *id)
    }

    pub fn membership(&self, module: ModuleId) -> Option<Membership> {
        self.modules.get(&module).copied()
    }

    /// Neither empty nor an alias: the chunk is emitted.
    pub fn is_live(&self) -> bool {
        !self.empty && self.alias_of.is_none()
    }
}

/// Outcome of registering a resolved path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Registration {
    New(ModuleId),
    Existing(ModuleId),
}

/// The single shared build structure.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyGraph {
    modules: Vec<ModuleRecord>,
    #[serde(skip)]
    by_path: FxHashMap<PathBuf, ModuleId>,
    boundaries: Vec<BoundaryRecord>,
    chunks: Vec<ChunkRecord>,
    /// Canonical in-parent key to the first chunk that produced it.
    #[serde(skip)]
    canonical_keys: FxHashMap<String, ChunkId>,
    entry: Option<ModuleId>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the id for `path`, allocating a fresh record on first sight.
    pub(crate) fn register(&mut self, path: &Path) -> Registration {
        if let Some(&id) = self.by_path.get(path) {
            return Registration::Existing(id);
        }

        let id = ModuleId::new(self.modules.len() as u32);
        self.modules.push(ModuleRecord::new(id, path.to_path_buf()));
        self.by_path.insert(path.to_path_buf(), id);
        Registration::New(id)
    }

    /// Store a module's source and flatten its require tree into the arena.
    pub(crate) fn populate(&mut self, id: ModuleId, source: String, tree: RequireContext) {
        let RequireContext {
            requires,
            async_boundaries,
            ..
        } = tree;

        let boundaries = async_boundaries
            .into_iter()
            .map(|context| self.flatten_boundary(id, None, context))
            .collect();

        if let Some(module) = self.modules.get_mut(id.index()) {
            module.source = source;
            module.requires = requires;
            module.boundaries = boundaries;
        }
    }

    fn flatten_boundary(
        &mut self,
        module: ModuleId,
        parent: Option<BoundaryId>,
        context: RequireContext,
    ) -> BoundaryId {
        let id = BoundaryId::new(self.boundaries.len() as u32);
        self.boundaries.push(BoundaryRecord {
            id,
            module,
            parent,
            requires: context.requires,
            boundaries: Vec::new(),
            preload_range: context.preload_range,
            position: context.position,
            chunk: None,
            chunk_memberships: BTreeSet::new(),
        });

        let nested: Vec<BoundaryId> = context
            .async_boundaries
            .into_iter()
            .map(|child| self.flatten_boundary(module, Some(id), child))
            .collect();
        self.boundaries[id.index()].boundaries = nested;
        id
    }

    pub fn module(&self, id: ModuleId) -> Option<&ModuleRecord> {
        self.modules.get(id.index())
    }

    pub fn module_by_path(&self, path: &Path) -> Option<&ModuleRecord> {
        self.by_path.get(path).and_then(|id| self.module(*id))
    }

    /// All modules, ascending by id.
    pub fn modules(&self) -> impl ExactSizeIterator<Item = &ModuleRecord> {
        self.modules.iter()
    }

    pub fn boundary(&self, id: BoundaryId) -> Option<&BoundaryRecord> {
        self.boundaries.get(id.index())
    }

    pub fn boundaries(&self) -> impl ExactSizeIterator<Item = &BoundaryRecord> {
        self.boundaries.iter()
    }

    pub fn chunk(&self, id: ChunkId) -> Option<&ChunkRecord> {
        self.chunks.get(id.index())
    }

    /// All chunks, ascending by id, including empty and aliased ones.
    pub fn chunks(&self) -> impl ExactSizeIterator<Item = &ChunkRecord> {
        self.chunks.iter()
    }

    /// Chunks that are emitted: neither empty nor aliased.
    pub fn live_chunks(&self) -> impl Iterator<Item = &ChunkRecord> {
        self.chunks.iter().filter(|chunk| chunk.is_live())
    }

    /// The entry module, once chunk construction has run.
    pub fn entry(&self) -> Option<&ModuleRecord> {
        self.entry.and_then(|id| self.module(id))
    }

    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Follow `alias_of` links to the chunk that stands for `id`.
    pub fn resolve_chunk(&self, id: ChunkId) -> ChunkId {
        let mut current = id;
        // Alias targets registered their own key, so this is at most one hop.
        for _ in 0..self.chunks.len() {
            match self.chunk(current).and_then(|chunk| chunk.alias_of) {
                Some(target) => current = target,
                None => break,
            }
        }
        current
    }

    /// Chunk id to emit for a boundary's preload literal.
    ///
    /// Aliases are followed first, so a boundary normally renders its alias
    /// target's id. When the chunk was eliminated as empty, or is aliased onto
    /// a chunk that was itself eliminated as empty, no file exists for it and
    /// the boundary points at the entry chunk instead.
    pub fn boundary_target(&self, id: BoundaryId) -> ChunkId {
        self.boundary(id)
            .and_then(|boundary| boundary.chunk)
            .map(|chunk| self.resolve_chunk(chunk))
            .filter(|chunk| self.chunk(*chunk).is_some_and(ChunkRecord::is_live))
            .unwrap_or(ChunkId::ENTRY)
    }
}
