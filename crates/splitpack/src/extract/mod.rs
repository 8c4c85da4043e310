//! Require extraction.
//!
//! Turns one module's source text into a tree of [`RequireContext`]s: the
//! module itself is the outermost context, and every `require.ensure(...)`
//! call opens a nested one. Each site keeps the byte range of its specifier
//! literal so the rewriter can splice ids into the untouched source later.

mod line_index;
mod oxc;

pub use oxc::OxcExtractor;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::graph::ModuleId;

/// Half-open byte range `[start, end)` into a module's source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ByteRange {
    pub start: u32,
    pub end: u32,
}

impl ByteRange {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }
}

/// A call-site position: line is 1-based, column 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourcePosition {
    pub line: u32,
    pub column: u32,
}

impl std::fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// One textual reference to another module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequireSite {
    /// The specifier exactly as written.
    pub specifier: String,

    /// Range of the specifier literal. `None` for preload entries of an
    /// async boundary, whose literal is rewritten as a whole.
    pub range: Option<ByteRange>,

    pub position: SourcePosition,

    /// Filled in by the graph builder once the specifier resolves.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved: Option<ModuleId>,
}

/// A lexical scope of require calls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequireContext {
    /// Synchronous edges of this scope. For a nested context this starts
    /// with the boundary's own preload specifiers.
    pub requires: Vec<RequireSite>,

    /// Nested async boundaries, in source order.
    pub async_boundaries: Vec<RequireContext>,

    /// Range of the boundary's first argument (string or array literal).
    /// `None` for the module's outermost context.
    pub preload_range: Option<ByteRange>,

    /// Position of the `require.ensure` call. `None` for the outermost context.
    pub position: Option<SourcePosition>,
}

impl RequireContext {
    /// Distinct specifiers across this context and every nested boundary,
    /// in first-seen order.
    pub fn specifiers(&self) -> Vec<&str> {
        let mut seen = FxHashSet::default();
        let mut out = Vec::new();
        self.collect_specifiers(&mut seen, &mut out);
        out
    }

    fn collect_specifiers<'a>(&'a self, seen: &mut FxHashSet<&'a str>, out: &mut Vec<&'a str>) {
        for site in &self.requires {
            if seen.insert(site.specifier.as_str()) {
                out.push(site.specifier.as_str());
            }
        }
        for boundary in &self.async_boundaries {
            boundary.collect_specifiers(seen, out);
        }
    }

    /// Assign `id` to every site in the tree whose specifier is `specifier`.
    pub fn assign(&mut self, specifier: &str, id: ModuleId) {
        for site in &mut self.requires {
            if site.specifier == specifier {
                site.resolved = Some(id);
            }
        }
        for boundary in &mut self.async_boundaries {
            boundary.assign(specifier, id);
        }
    }

    /// Position of the first site referencing `specifier`.
    pub fn first_position(&self, specifier: &str) -> Option<SourcePosition> {
        self.requires
            .iter()
            .find(|site| site.specifier == specifier)
            .map(|site| site.position)
            .or_else(|| {
                self.async_boundaries
                    .iter()
                    .find_map(|boundary| boundary.first_position(specifier))
            })
    }

    /// Number of require sites in the whole tree, preload entries included.
    pub fn site_count(&self) -> usize {
        self.requires.len()
            + self
                .async_boundaries
                .iter()
                .map(RequireContext::site_count)
                .sum::<usize>()
    }
}

/// Extraction failure. Both variants abort the whole build.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractError {
    /// A recognised require call with an unusable first argument.
    #[error("line {line}, column {column}: {reason}")]
    MalformedRequire {
        line: u32,
        column: u32,
        reason: String,
    },

    /// The source could not be parsed at all.
    #[error("{message}")]
    Parse { message: String },
}

/// Source-dialect specific require extraction.
///
/// The graph builder only sees this trait, so a different dialect can be
/// plugged in through [`Builder::with_extractor`](crate::Builder::with_extractor).
pub trait RequireExtractor: Send + Sync + std::fmt::Debug {
    fn extract(&self, source: &str) -> Result<RequireContext, ExtractError>;
}
