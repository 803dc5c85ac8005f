//! Sitesage: crawl a website, ask it questions
//!
//! This crate implements an HTTP service that ingests a site's content via a
//! bounded depth-first crawl, builds an in-memory vector index over the
//! extracted text, and answers natural-language questions about the site with
//! source attribution.

pub mod config;
pub mod crawler;
pub mod index;
pub mod llm;
pub mod rag;
pub mod registry;
pub mod server;
pub mod url;

use thiserror::Error;

/// Main error type for sitesage operations
#[derive(Debug, Error)]
pub enum SageError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("No documents were extracted during crawling")]
    EmptyCorpus,

    #[error("Website {url} has not been crawled yet")]
    CorpusNotFound { url: String },

    #[error("Embedding request failed: {0}")]
    Embedding(String),

    #[error("Answer generation failed: {0}")]
    Generation(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Missing API key: {0}")]
    MissingApiKey(String),
}

/// Result type alias for sitesage operations
pub type Result<T> = std::result::Result<T, SageError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlOptions, CrawlOutcome, Document, DocumentMetadata, TraversalEngine};
pub use index::{build_index, CorpusIndex, TextChunker};
pub use rag::{answer, Answer};
pub use registry::CorpusRegistry;
