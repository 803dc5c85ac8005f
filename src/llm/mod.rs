//! Language-model collaborators
//!
//! The embedding and generation backends are external capabilities with
//! latency and failure modes of their own, so each is modeled as a narrow
//! trait with a single method and an explicit failure signal. The core
//! pipeline and its tests depend only on these traits, never on a concrete
//! backend.

mod embeddings;
mod groq;

pub use embeddings::OpenAiEmbedder;
pub use groq::GroqChat;

use async_trait::async_trait;
use thiserror::Error;

/// Errors from the embedding and chat collaborators
#[derive(Debug, Error)]
pub enum LlmError {
    /// The required API key was absent from the environment at startup.
    /// Startup proceeds anyway; the failure surfaces here, on first use.
    #[error("{0} not configured")]
    MissingApiKey(&'static str),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Capability: embed a batch of texts into fixed-dimensionality vectors
///
/// Implementations must preserve input order and return exactly one vector
/// per input. Queries and chunks must go through the same implementation so
/// their embedding spaces match.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError>;
}

/// Capability: complete a prompt into generated text
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Completes `prompt`, optionally overriding the default model
    async fn complete(&self, prompt: &str, model: Option<&str>) -> Result<String, LlmError>;
}
