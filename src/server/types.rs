//! Request and response bodies for the HTTP API

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Body of `POST /crawl`
#[derive(Debug, Deserialize)]
pub struct CrawlRequest {
    /// Seed URL to crawl
    pub url: String,

    /// Optional mapping of content-type label to CSS selector
    #[serde(default)]
    pub selector_config: Option<HashMap<String, String>>,

    /// Fetch every page through the browser-rendering collaborator
    #[serde(default)]
    pub use_browser_fetch: bool,

    /// Seconds to wait for dynamic content when browser fetching; ignored
    /// when no browser collaborator is configured
    #[serde(default)]
    pub wait_time: Option<u64>,

    /// Override the configured crawl depth for this request
    #[serde(default)]
    pub max_depth: Option<u32>,

    /// Override the configured page cap for this request
    #[serde(default)]
    pub max_pages: Option<usize>,

    /// Retry bot-challenge pages through the browser collaborator
    #[serde(default)]
    pub fallback_to_browser: bool,
}

/// Body of a successful (or warning) `POST /crawl` response
#[derive(Debug, Serialize, Deserialize)]
pub struct CrawlResponse {
    /// `"success"` when an index was built, `"warning"` when the crawl
    /// yielded no indexable content
    pub status: String,
    pub message: String,
    pub chunks_count: usize,
    pub pages_crawled: usize,
    pub documents_extracted: usize,
    /// First characters of the first extracted document, when any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_preview: Option<String>,
}

/// Body of `POST /chat`
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// Seed URL of a previously crawled site
    pub url: String,
    pub query: String,
    /// Optional chat-model override for this request
    #[serde(default)]
    pub model: Option<String>,
}

/// Body of a successful `POST /chat` response
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub answer: String,
    /// Distinct source page URLs, best match first
    pub sources: Vec<String>,
}

/// Body of `GET /health`
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Body of a successful `DELETE /clear/{url}` response
#[derive(Debug, Serialize, Deserialize)]
pub struct ClearResponse {
    pub status: String,
    pub message: String,
}

/// Error body for every failure response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}
