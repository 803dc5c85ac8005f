//! Crawler module
//!
//! Fetching, page extraction, and the bounded depth-first traversal engine.

mod extractor;
mod fetcher;
mod traversal;

pub use extractor::{extract, Document, DocumentMetadata, ExtractedPage};
pub use fetcher::{FetchError, Fetcher, HttpFetcher, RenderedFallback};
pub use traversal::{CrawlOptions, CrawlOutcome, TraversalEngine};
