//! Text chunking
//!
//! Splits document text into bounded, overlapping chunks, preferring to cut
//! at paragraph, then line, then word boundaries before falling back to a
//! hard character cut. Chunks are contiguous substrings of the source text;
//! each records how many bytes it shares with its predecessor, so
//! concatenating a document's chunks minus those overlaps reconstructs the
//! original text exactly.

use std::sync::Arc;

use crate::crawler::{Document, DocumentMetadata};

/// Boundary preference order for choosing a cut point
const SEPARATORS: [&str; 3] = ["\n\n", "\n", " "];

/// A bounded, overlapping substring of a document's text
#[derive(Debug, Clone)]
pub struct Chunk {
    pub text: String,

    /// Parent document metadata, shared rather than copied per chunk
    pub metadata: Arc<DocumentMetadata>,

    /// Number of bytes at the start of this chunk that repeat the end of the
    /// previous chunk (0 for a document's first chunk)
    pub overlap_with_previous: usize,
}

/// Splits documents into embeddable chunks of a fixed target size
pub struct TextChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextChunker {
    /// Creates a new chunker
    ///
    /// # Arguments
    ///
    /// * `chunk_size` - Target chunk size in bytes (must be at least 1)
    /// * `chunk_overlap` - Overlap between consecutive chunks in bytes
    ///   (must be smaller than `chunk_size`; enforced by config validation)
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            chunk_overlap: chunk_overlap.min(chunk_size.saturating_sub(1)),
        }
    }

    /// Splits a document into chunks that share its metadata
    pub fn split_document(&self, document: &Document) -> Vec<Chunk> {
        let metadata = Arc::new(document.metadata.clone());
        self.split_text(&document.text)
            .into_iter()
            .map(|(start, end, overlap)| Chunk {
                text: document.text[start..end].to_string(),
                metadata: Arc::clone(&metadata),
                overlap_with_previous: overlap,
            })
            .collect()
    }

    /// Computes `(start, end, overlap_with_previous)` byte ranges over `text`
    ///
    /// Every range is contiguous with its successor: the next range starts
    /// exactly `overlap` bytes before this one ends. All indices fall on
    /// char boundaries.
    fn split_text(&self, text: &str) -> Vec<(usize, usize, usize)> {
        let mut ranges = Vec::new();
        if text.is_empty() {
            return ranges;
        }

        let len = text.len();
        let mut start = 0;
        let mut overlap = 0;

        loop {
            // Everything left fits in one chunk
            if len - start <= self.chunk_size {
                ranges.push((start, len, overlap));
                break;
            }

            let hard_end = floor_char_boundary(text, start + self.chunk_size);
            let mut end = self.pick_break(text, start, hard_end);
            // A chunk size smaller than the character at the cut point would
            // collapse the range to zero width; consume that character whole.
            if end <= start {
                end = ceil_char_boundary(text, start + 1);
            }
            ranges.push((start, end, overlap));

            // Step the next start back by the configured overlap, staying on
            // a char boundary and strictly past the current start so the
            // traversal always makes progress.
            let target = end.saturating_sub(self.chunk_overlap).max(start + 1);
            let next_start = ceil_char_boundary(text, target);
            if next_start >= len {
                break;
            }
            overlap = end - next_start;
            start = next_start;
        }

        ranges
    }

    /// Chooses a cut point in `(start, hard_end]`, preferring paragraph, then
    /// line, then word boundaries found in the back half of the window
    fn pick_break(&self, text: &str, start: usize, hard_end: usize) -> usize {
        // Never shrink a chunk below half its target size; tiny chunks would
        // be swallowed by the overlap of their successors.
        let floor = start + (self.chunk_size / 2).max(1);
        let floor = ceil_char_boundary(text, floor.min(hard_end));
        if floor >= hard_end {
            return hard_end;
        }

        let window = &text[floor..hard_end];
        for separator in SEPARATORS {
            if let Some(pos) = window.rfind(separator) {
                let cut = floor + pos + separator.len();
                if cut > start && cut <= hard_end {
                    return cut;
                }
            }
        }

        hard_end
    }
}

fn floor_char_boundary(text: &str, mut index: usize) -> usize {
    while index > 0 && !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

fn ceil_char_boundary(text: &str, mut index: usize) -> usize {
    while index < text.len() && !text.is_char_boundary(index) {
        index += 1;
    }
    index
}
