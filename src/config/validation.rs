use crate::config::types::Config;
use crate::ConfigError;
use std::net::SocketAddr;

/// Validates a parsed configuration
///
/// # Rules
///
/// - `server.bind` must parse as a socket address
/// - `crawler.max-pages` must be at least 1
/// - `chunking.chunk-size` must be at least 1
/// - `chunking.chunk-overlap` must be strictly smaller than `chunk-size`
/// - `retrieval.top-k` must be at least 1
/// - `llm.embedding-batch-size` must be at least 1
///
/// # Returns
///
/// * `Ok(())` - Configuration is valid
/// * `Err(ConfigError::Validation)` - A rule was violated
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.server.bind.parse::<SocketAddr>().is_err() {
        return Err(ConfigError::Validation(format!(
            "server.bind is not a valid socket address: {}",
            config.server.bind
        )));
    }

    if config.crawler.max_pages == 0 {
        return Err(ConfigError::Validation(
            "crawler.max-pages must be at least 1".to_string(),
        ));
    }

    if config.chunking.chunk_size == 0 {
        return Err(ConfigError::Validation(
            "chunking.chunk-size must be at least 1".to_string(),
        ));
    }

    if config.chunking.chunk_overlap >= config.chunking.chunk_size {
        return Err(ConfigError::Validation(format!(
            "chunking.chunk-overlap ({}) must be smaller than chunk-size ({})",
            config.chunking.chunk_overlap, config.chunking.chunk_size
        )));
    }

    if config.retrieval.top_k == 0 {
        return Err(ConfigError::Validation(
            "retrieval.top-k must be at least 1".to_string(),
        ));
    }

    if config.llm.embedding_batch_size == 0 {
        return Err(ConfigError::Validation(
            "llm.embedding-batch-size must be at least 1".to_string(),
        ));
    }

    Ok(())
}
