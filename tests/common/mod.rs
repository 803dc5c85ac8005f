#![allow(dead_code)]

//! Shared helpers for the integration tests
//!
//! Builds the full application state over a real HTTP fetcher (pointed at a
//! wiremock site) with deterministic stand-ins for the embedding and chat
//! collaborators.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use std::sync::Arc;
use tower::util::ServiceExt;

use sitesage::config::Config;
use sitesage::crawler::HttpFetcher;
use sitesage::llm::{ChatModel, Embedder, LlmError};
use sitesage::server::{build_router, AppState};
use sitesage::{CorpusRegistry, TextChunker, TraversalEngine};

/// Deterministic embedder: vector derived from text length and first byte
pub struct TestEmbedder;

#[async_trait]
impl Embedder for TestEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError> {
        Ok(texts
            .iter()
            .map(|t| {
                vec![
                    t.len() as f32,
                    *t.as_bytes().first().unwrap_or(&0) as f32,
                    1.0,
                ]
            })
            .collect())
    }
}

/// Chat stand-in that returns the prompt it was given, so tests can assert
/// on the retrieved context
pub struct EchoChat;

#[async_trait]
impl ChatModel for EchoChat {
    async fn complete(&self, prompt: &str, _model: Option<&str>) -> Result<String, LlmError> {
        Ok(prompt.to_string())
    }
}

/// Chat stand-in whose collaborator key was never configured
pub struct KeylessChat;

#[async_trait]
impl ChatModel for KeylessChat {
    async fn complete(&self, _prompt: &str, _model: Option<&str>) -> Result<String, LlmError> {
        Err(LlmError::MissingApiKey("GROQ_API_KEY"))
    }
}

/// Builds a router over the given configuration and chat collaborator
pub fn router_with_chat(config: Config, chat: Arc<dyn ChatModel>) -> Router {
    let fetcher = Arc::new(HttpFetcher::new(&config.crawler).unwrap());
    let state = AppState {
        chunker: Arc::new(TextChunker::new(
            config.chunking.chunk_size,
            config.chunking.chunk_overlap,
        )),
        engine: Arc::new(TraversalEngine::new(fetcher, None)),
        registry: Arc::new(CorpusRegistry::new()),
        embedder: Arc::new(TestEmbedder),
        chat,
        config: Arc::new(config),
    };
    build_router(state)
}

/// Builds a router with the echoing chat collaborator
pub fn router_for(config: Config) -> Router {
    router_with_chat(config, Arc::new(EchoChat))
}

/// Test configuration tuned for small mock sites
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.crawler.min_content_length = 10;
    config.crawler.fetch_timeout_secs = 2;
    config.chunking.chunk_size = 200;
    config.chunking.chunk_overlap = 40;
    config
}

/// Sends a JSON request and returns the status and decoded body
pub async fn send_json(
    router: &Router,
    method: &str,
    path: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(path);
    let request = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            builder.body(Body::from(json.to_string())).unwrap()
        }
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}
