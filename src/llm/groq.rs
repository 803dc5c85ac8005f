//! Groq chat-completions client
//!
//! Groq exposes an OpenAI-compatible `/chat/completions` endpoint, so the
//! wire format here also works against any other compatible backend by
//! pointing `chat-base-url` elsewhere.

use async_trait::async_trait;
use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::LlmConfig;
use crate::llm::{ChatModel, LlmError};

/// Chat client for Groq's OpenAI-compatible completions endpoint
pub struct GroqChat {
    client: Client,
    endpoint: String,
    default_model: String,
    api_key: Option<String>,
}

impl GroqChat {
    /// Builds a chat client from the LLM configuration
    ///
    /// A missing API key does not fail construction; requests fail with
    /// [`LlmError::MissingApiKey`] instead.
    pub fn new(config: &LlmConfig, api_key: Option<String>) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let endpoint = format!(
            "{}/chat/completions",
            config.chat_base_url.trim_end_matches('/')
        );
        Ok(Self {
            client,
            endpoint,
            default_model: config.chat_model.clone(),
            api_key,
        })
    }
}

#[async_trait]
impl ChatModel for GroqChat {
    async fn complete(&self, prompt: &str, model: Option<&str>) -> Result<String, LlmError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or(LlmError::MissingApiKey("GROQ_API_KEY"))?;
        let auth = HeaderValue::from_str(&format!("Bearer {}", key.trim()))
            .map_err(|_| LlmError::InvalidResponse("API key is not a valid header".to_string()))?;

        let body = ChatRequest {
            model: model.unwrap_or(&self.default_model),
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };
        let response = self
            .client
            .post(&self.endpoint)
            .header(AUTHORIZATION, auth)
            .json(&body)
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

        let parsed: ChatResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| LlmError::InvalidResponse("response contained no choices".to_string()))
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: String,
}
