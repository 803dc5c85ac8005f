//! OpenAI-compatible embeddings client

use async_trait::async_trait;
use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::LlmConfig;
use crate::llm::{Embedder, LlmError};

/// Embeddings client for OpenAI-compatible `/embeddings` endpoints
///
/// Inputs are sent in configured-size batches; responses are re-sorted by
/// index so the output order always matches the input order. Transient
/// failures are surfaced, not retried.
pub struct OpenAiEmbedder {
    client: Client,
    endpoint: String,
    model: String,
    batch_size: usize,
    api_key: Option<String>,
}

impl OpenAiEmbedder {
    /// Builds an embeddings client from the LLM configuration
    ///
    /// A missing API key does not fail construction; requests fail with
    /// [`LlmError::MissingApiKey`] instead.
    pub fn new(config: &LlmConfig, api_key: Option<String>) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let endpoint = format!(
            "{}/embeddings",
            config.embedding_base_url.trim_end_matches('/')
        );
        Ok(Self {
            client,
            endpoint,
            model: config.embedding_model.clone(),
            batch_size: config.embedding_batch_size.max(1),
            api_key,
        })
    }

    async fn embed_one_batch(&self, key: &str, inputs: &[String]) -> Result<Vec<Vec<f32>>, LlmError> {
        let request = EmbeddingRequest {
            model: &self.model,
            input: inputs,
        };
        let auth = HeaderValue::from_str(&format!("Bearer {}", key.trim()))
            .map_err(|_| LlmError::InvalidResponse("API key is not a valid header".to_string()))?;
        let response = self
            .client
            .post(&self.endpoint)
            .header(AUTHORIZATION, auth)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let mut parsed: EmbeddingResponse = response.json().await?;
        parsed.data.sort_by_key(|entry| entry.index);
        if parsed.data.len() != inputs.len() {
            return Err(LlmError::InvalidResponse(format!(
                "got {} embeddings for {} inputs",
                parsed.data.len(),
                inputs.len()
            )));
        }
        Ok(parsed.data.into_iter().map(|e| e.embedding).collect())
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let key = self
            .api_key
            .as_deref()
            .ok_or(LlmError::MissingApiKey("OPENAI_API_KEY"))?;

        let mut vectors = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            vectors.extend(self.embed_one_batch(key, batch).await?);
        }
        Ok(vectors)
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}
