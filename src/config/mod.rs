//! Configuration module for sitesage
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files, plus the API keys read from the environment at startup.
//!
//! # Example
//!
//! ```no_run
//! use sitesage::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.crawler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    ApiKeys, ChunkingConfig, Config, CrawlerConfig, LlmConfig, RetrievalConfig, ServerConfig,
};

// Re-export parser functions
pub use parser::load_config;

// Re-export validation
pub use validation::validate;
