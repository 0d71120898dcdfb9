// Copyright 2025 ContextGauge (https://github.com/contextgauge)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Retrieval seam.
//!
//! The evaluator never calls retrieval; the agent consumes chunks through
//! [`ContextRetriever`]. The in-memory implementation here is a lexical
//! stand-in for a real vector store, good enough for development and tests.

use std::path::Path;

use contextgauge_core::ContextChunk;
use tracing::info;

#[async_trait::async_trait]
pub trait ContextRetriever: Send + Sync {
    /// Returns up to `top_k` chunks ordered by estimated relevance.
    async fn retrieve(&self, query: &str, top_k: usize) -> Vec<ContextChunk>;
}

/// Term-overlap retriever over documents held in memory.
///
/// Scoring is case-insensitive query-term overlap; ties break by insertion
/// order so results are deterministic. Chunks with zero overlap are never
/// returned.
#[derive(Default)]
pub struct MemoryRetriever {
    documents: Vec<ContextChunk>,
}

impl MemoryRetriever {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_document(&mut self, chunk: ContextChunk) {
        self.documents.push(chunk);
    }

    /// Loads every regular file in `dir` as one document, keyed by its file
    /// name. A missing directory is an empty retriever, not an error.
    pub fn from_dir(dir: &Path) -> std::io::Result<Self> {
        let mut retriever = Self::new();
        if !dir.is_dir() {
            return Ok(retriever);
        }

        let mut entries: Vec<_> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .collect();
        entries.sort();

        for path in entries {
            let Ok(text) = std::fs::read_to_string(&path) else {
                continue; // skip binary files
            };
            let source = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            retriever.add_document(ContextChunk::with_source(text, source));
        }

        info!(count = retriever.documents.len(), dir = %dir.display(), "loaded documents");
        Ok(retriever)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    fn score(query_terms: &[String], text: &str) -> usize {
        let haystack = text.to_lowercase();
        query_terms
            .iter()
            .filter(|term| haystack.contains(term.as_str()))
            .count()
    }
}

#[async_trait::async_trait]
impl ContextRetriever for MemoryRetriever {
    async fn retrieve(&self, query: &str, top_k: usize) -> Vec<ContextChunk> {
        let query_terms: Vec<String> = query
            .to_lowercase()
            .split_whitespace()
            .filter(|term| term.len() > 2)
            .map(str::to_string)
            .collect();

        if query_terms.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<(usize, usize)> = self
            .documents
            .iter()
            .enumerate()
            .map(|(i, doc)| (i, Self::score(&query_terms, &doc.text)))
            .filter(|&(_, score)| score > 0)
            .collect();

        // Score descending, insertion order for ties.
        scored.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

        scored
            .into_iter()
            .take(top_k)
            .map(|(i, _)| self.documents[i].clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn planet_retriever() -> MemoryRetriever {
        let mut retriever = MemoryRetriever::new();
        retriever.add_document(ContextChunk::with_source(
            "The IAU definition requires a planet to clear its orbital neighbourhood.",
            "iau.txt",
        ));
        retriever.add_document(ContextChunk::with_source(
            "Pluto is classified as a dwarf planet because it has not cleared its orbit.",
            "pluto.txt",
        ));
        retriever.add_document(ContextChunk::with_source(
            "Bread rises because yeast produces carbon dioxide.",
            "baking.txt",
        ));
        retriever
    }

    #[tokio::test]
    async fn test_retrieve_orders_by_overlap() {
        let retriever = planet_retriever();
        let chunks = retriever
            .retrieve("why is pluto a dwarf planet and not a planet", 10)
            .await;

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].source.as_deref(), Some("pluto.txt"));
        assert_eq!(chunks[1].source.as_deref(), Some("iau.txt"));
    }

    #[tokio::test]
    async fn test_retrieve_respects_top_k() {
        let retriever = planet_retriever();
        let chunks = retriever.retrieve("planet orbit", 1).await;
        assert_eq!(chunks.len(), 1);
    }

    #[tokio::test]
    async fn test_zero_overlap_excluded() {
        let retriever = planet_retriever();
        let chunks = retriever.retrieve("quantum chromodynamics", 10).await;
        assert!(chunks.is_empty());
    }

    #[tokio::test]
    async fn test_short_terms_ignored() {
        let retriever = planet_retriever();
        // Every term is <= 2 chars, so nothing to match on.
        let chunks = retriever.retrieve("is a of", 10).await;
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_from_dir_loads_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "alpha document").unwrap();
        std::fs::write(dir.path().join("b.txt"), "beta document").unwrap();

        let retriever = MemoryRetriever::from_dir(dir.path()).unwrap();
        assert_eq!(retriever.len(), 2);
    }

    #[test]
    fn test_from_dir_missing_is_empty() {
        let retriever = MemoryRetriever::from_dir(Path::new("/nonexistent/path")).unwrap();
        assert!(retriever.is_empty());
    }
}
