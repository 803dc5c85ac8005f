//! Indexing pipeline
//!
//! Turns a crawl's document set into a queryable corpus index: split into
//! overlapping chunks, embed every chunk's text, and build the in-memory
//! similarity index. The pipeline is stateless; running it twice over the
//! same documents yields an index with identical retrieval behavior.

mod chunker;
mod store;

pub use chunker::{Chunk, TextChunker};
pub use store::{CorpusIndex, IndexEntry, SearchHit};

use crate::crawler::Document;
use crate::llm::Embedder;
use crate::{Result, SageError};

/// Builds a corpus index from a crawl's extracted documents
///
/// # Arguments
///
/// * `seed_url` - The URL the documents were crawled from; becomes the
///   index's registry key
/// * `documents` - Extracted documents, consumed read-only
/// * `chunker` - Chunking policy
/// * `embedder` - Embedding collaborator; chunk order and identity are
///   preserved through batching
///
/// # Errors
///
/// * [`SageError::EmptyCorpus`] - No documents, or no chunks survived
///   splitting; callers surface this as "nothing to index"
/// * [`SageError::Embedding`] - The embedding collaborator failed
pub async fn build_index(
    seed_url: &str,
    documents: &[Document],
    chunker: &TextChunker,
    embedder: &dyn Embedder,
) -> Result<CorpusIndex> {
    if documents.is_empty() {
        return Err(SageError::EmptyCorpus);
    }

    let chunks: Vec<Chunk> = documents
        .iter()
        .flat_map(|doc| chunker.split_document(doc))
        .collect();

    if chunks.is_empty() {
        return Err(SageError::EmptyCorpus);
    }

    tracing::debug!(
        "Embedding {} chunks from {} documents for {}",
        chunks.len(),
        documents.len(),
        seed_url
    );

    let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
    let embeddings = embedder
        .embed_batch(&texts)
        .await
        .map_err(|e| SageError::Embedding(e.to_string()))?;

    if embeddings.len() != chunks.len() {
        return Err(SageError::Embedding(format!(
            "embedder returned {} vectors for {} chunks",
            embeddings.len(),
            chunks.len()
        )));
    }

    Ok(CorpusIndex::new(seed_url.to_string(), chunks, embeddings))
}
