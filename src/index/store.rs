//! In-memory vector index
//!
//! Exact cosine-similarity nearest-neighbor search over the chunk embeddings
//! of one crawled site. Corpora are bounded by the crawl's page cap and live
//! only for the process lifetime, so an approximate structure buys nothing;
//! exact search also makes retrieval order fully deterministic.

use crate::index::chunker::Chunk;

/// One indexed chunk and its embedding vector
#[derive(Debug, Clone)]
pub struct IndexEntry {
    pub chunk: Chunk,
    pub embedding: Vec<f32>,
}

/// A retrieval hit: the matched chunk and its similarity score
#[derive(Debug)]
pub struct SearchHit<'a> {
    pub chunk: &'a Chunk,
    pub score: f32,
}

/// The queryable index for one seed URL
#[derive(Debug)]
pub struct CorpusIndex {
    seed_url: String,
    entries: Vec<IndexEntry>,
    dimension: usize,
}

impl CorpusIndex {
    /// Builds an index over parallel chunk and embedding vectors
    ///
    /// The two slices are paired positionally; the caller guarantees equal
    /// length and a consistent embedding dimensionality.
    pub fn new(seed_url: String, chunks: Vec<Chunk>, embeddings: Vec<Vec<f32>>) -> Self {
        debug_assert_eq!(chunks.len(), embeddings.len());
        let dimension = embeddings.first().map(|v| v.len()).unwrap_or(0);
        let entries = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| IndexEntry { chunk, embedding })
            .collect();
        Self {
            seed_url,
            entries,
            dimension,
        }
    }

    /// The seed URL this corpus was crawled from
    pub fn seed_url(&self) -> &str {
        &self.seed_url
    }

    /// Number of indexed chunks
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Embedding dimensionality of this index
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Returns the `k` most similar chunks to the query vector
    ///
    /// Results are ordered by descending cosine similarity; ties keep
    /// insertion order, so retrieval is deterministic for a fixed index and
    /// query.
    pub fn search(&self, query: &[f32], k: usize) -> Vec<SearchHit<'_>> {
        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (i, cosine_similarity(query, &entry.embedding)))
            .collect();

        // Stable sort keeps insertion order among equal scores
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);

        scored
            .into_iter()
            .map(|(i, score)| SearchHit {
                chunk: &self.entries[i].chunk,
                score,
            })
            .collect()
    }
}

/// Cosine similarity between two vectors
///
/// Mismatched lengths compare over the shorter prefix; a zero vector scores
/// 0.0 rather than dividing by zero.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 {
        0.0
    } else {
        dot / denom
    }
}
