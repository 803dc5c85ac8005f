use serde::Deserialize;

/// Main configuration structure for sitesage
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub llm: LlmConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address to bind the HTTP server to (host:port)
    #[serde(default = "default_bind")]
    pub bind: String,
}

/// Crawler behavior configuration
///
/// These are process-wide defaults; individual crawl requests may override
/// `max-depth` and `max-pages`.
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum depth to crawl from the seed URL
    #[serde(rename = "max-depth", default = "default_max_depth")]
    pub max_depth: u32,

    /// Maximum number of pages visited per crawl
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: usize,

    /// Pages whose extracted text is shorter than this are not indexed
    /// (their links are still followed)
    #[serde(rename = "min-content-length", default = "default_min_content_length")]
    pub min_content_length: usize,

    /// Restrict the traversal to the seed URL's host
    #[serde(rename = "same-origin", default = "default_same_origin")]
    pub same_origin: bool,

    /// Per-request fetch timeout in seconds
    #[serde(rename = "fetch-timeout-secs", default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,

    /// User-Agent header sent with every fetch
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Upper bound on concurrent rendered (browser) fetches, when a rendered
    /// fetch collaborator is configured
    #[serde(rename = "max-rendered-fetches", default = "default_max_rendered")]
    pub max_rendered_fetches: usize,
}

/// Text chunking configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ChunkingConfig {
    /// Target chunk size in characters
    #[serde(rename = "chunk-size", default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Overlap between consecutive chunks in characters
    #[serde(rename = "chunk-overlap", default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
}

/// Retrieval configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RetrievalConfig {
    /// Number of chunks retrieved per query
    #[serde(rename = "top-k", default = "default_top_k")]
    pub top_k: usize,
}

/// Language-model collaborator configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    /// Base URL for the OpenAI-compatible embeddings endpoint
    #[serde(rename = "embedding-base-url", default = "default_embedding_base_url")]
    pub embedding_base_url: String,

    /// Embedding model identifier
    #[serde(rename = "embedding-model", default = "default_embedding_model")]
    pub embedding_model: String,

    /// Max inputs per embedding request
    #[serde(rename = "embedding-batch-size", default = "default_embedding_batch")]
    pub embedding_batch_size: usize,

    /// Base URL for the OpenAI-compatible chat completions endpoint
    #[serde(rename = "chat-base-url", default = "default_chat_base_url")]
    pub chat_base_url: String,

    /// Default chat model; individual chat requests may override it
    #[serde(rename = "chat-model", default = "default_chat_model")]
    pub chat_model: String,

    /// Timeout in seconds for embedding and chat requests
    #[serde(rename = "timeout-secs", default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

/// API keys read from the environment once at process start
///
/// A missing key is logged as a warning at startup; the failure surfaces as a
/// configuration error from the first request that needs it.
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    /// Key for the embeddings endpoint (`OPENAI_API_KEY`)
    pub embedding: Option<String>,
    /// Key for the chat completions endpoint (`GROQ_API_KEY`)
    pub chat: Option<String>,
}

impl ApiKeys {
    /// Reads both keys from the environment, warning on absence
    pub fn from_env() -> Self {
        let embedding = read_key("OPENAI_API_KEY");
        let chat = read_key("GROQ_API_KEY");
        Self { embedding, chat }
    }
}

fn read_key(name: &str) -> Option<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Some(value),
        _ => {
            tracing::warn!("{} not found in environment variables", name);
            None
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8000".to_string()
}

fn default_max_depth() -> u32 {
    1
}

fn default_max_pages() -> usize {
    25
}

fn default_min_content_length() -> usize {
    100
}

fn default_same_origin() -> bool {
    true
}

fn default_fetch_timeout() -> u64 {
    10
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/91.0.4472.124 Safari/537.36"
        .to_string()
}

fn default_max_rendered() -> usize {
    2
}

fn default_chunk_size() -> usize {
    1000
}

fn default_chunk_overlap() -> usize {
    200
}

fn default_top_k() -> usize {
    3
}

fn default_embedding_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_embedding_batch() -> usize {
    32
}

fn default_chat_base_url() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_chat_model() -> String {
    "llama3-70b-8192".to_string()
}

fn default_llm_timeout() -> u64 {
    60
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            max_pages: default_max_pages(),
            min_content_length: default_min_content_length(),
            same_origin: default_same_origin(),
            fetch_timeout_secs: default_fetch_timeout(),
            user_agent: default_user_agent(),
            max_rendered_fetches: default_max_rendered(),
        }
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            embedding_base_url: default_embedding_base_url(),
            embedding_model: default_embedding_model(),
            embedding_batch_size: default_embedding_batch(),
            chat_base_url: default_chat_base_url(),
            chat_model: default_chat_model(),
            timeout_secs: default_llm_timeout(),
        }
    }
}
