//! Bundle statistics.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use splitpack::{ChunkId, DependencyGraph};

/// Aggregate numbers for a split build.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleStats {
    /// Chunks that produced a file.
    pub chunk_count: usize,
    /// Distinct modules in the graph.
    pub modules_count: usize,
    /// Included modules summed over every chunk.
    pub modules_including_duplicates: usize,
    /// `modules_including_duplicates / chunk_count`, one decimal place.
    pub modules_per_chunk: f64,
    /// Modules included in the entry chunk.
    pub modules_first_chunk: usize,
    /// Bytes written per file name.
    pub file_sizes: BTreeMap<String, usize>,
}

impl BundleStats {
    pub(crate) fn collect(graph: &DependencyGraph, file_sizes: BTreeMap<String, usize>) -> Self {
        let chunk_count = file_sizes.len();
        let modules_including_duplicates: usize = graph
            .chunks()
            .map(|chunk| chunk.included().count())
            .sum();
        let modules_first_chunk = graph
            .chunk(ChunkId::ENTRY)
            .map(|chunk| chunk.included().count())
            .unwrap_or(0);

        Self {
            chunk_count,
            modules_count: graph.module_count(),
            modules_including_duplicates,
            modules_per_chunk: per_chunk(modules_including_duplicates, chunk_count),
            modules_first_chunk,
            file_sizes,
        }
    }
}

fn per_chunk(modules: usize, chunks: usize) -> f64 {
    if chunks == 0 {
        return 0.0;
    }
    (modules as f64 / chunks as f64 * 10.0).round() / 10.0
}

impl fmt::Display for BundleStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Chunks: {}", self.chunk_count)?;
        writeln!(f, "Modules: {}", self.modules_count)?;
        writeln!(
            f,
            "Modules including duplicates: {}",
            self.modules_including_duplicates
        )?;
        writeln!(f, "Modules per chunk: {}", self.modules_per_chunk)?;
        write!(f, "Modules first chunk: {}", self.modules_first_chunk)?;
        let width = self.file_sizes.keys().map(String::len).max().unwrap_or(0);
        for (name, size) in &self.file_sizes {
            write!(f, "\n{name:>width$}:  {size} bytes")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_per_chunk_rounds_to_one_decimal() {
        assert_eq!(per_chunk(4, 3), 1.3);
        assert_eq!(per_chunk(5, 3), 1.7);
        assert_eq!(per_chunk(6, 2), 3.0);
        assert_eq!(per_chunk(3, 0), 0.0);
    }

    #[test]
    fn test_display_lists_file_sizes() {
        let stats = BundleStats {
            chunk_count: 2,
            modules_count: 4,
            modules_including_duplicates: 4,
            modules_per_chunk: 2.0,
            modules_first_chunk: 3,
            file_sizes: BTreeMap::from([("1.web.js".to_string(), 120), ("web.js".to_string(), 900)]),
        };

        let text = stats.to_string();
        assert!(text.starts_with("Chunks: 2\nModules: 4\n"));
        assert!(text.contains("Modules per chunk: 2\n"));
        assert!(text.contains("1.web.js:  120 bytes"));
        assert!(text.contains("  web.js:  900 bytes"));
    }
}
