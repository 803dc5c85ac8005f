//! Retrieval-augmented answering
//!
//! Embeds the question, retrieves the most similar chunks from a corpus
//! index, and asks the chat model to answer strictly from that context. The
//! model's output is returned verbatim; sources are the distinct page URLs
//! of the retrieved chunks in rank order.

use crate::index::CorpusIndex;
use crate::llm::{ChatModel, Embedder, LlmError};
use crate::{ConfigError, Result, SageError};

/// A generated answer and the pages it was grounded on
#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    pub answer: String,
    /// Distinct source URLs of the retrieved chunks, best match first
    pub sources: Vec<String>,
}

/// Answers `query` from the corpus behind `index`
///
/// # Arguments
///
/// * `index` - The corpus to retrieve from
/// * `query` - The user's question, embedded as-is
/// * `k` - How many chunks to retrieve
/// * `embedder` - Must be the same implementation the index was built with
/// * `chat` - Generation collaborator
/// * `model` - Optional per-request model override
///
/// # Errors
///
/// * [`SageError::Config`] - A required API key was never configured
/// * [`SageError::Embedding`] / [`SageError::Generation`] - A collaborator
///   failed; no retry is attempted
pub async fn answer(
    index: &CorpusIndex,
    query: &str,
    k: usize,
    embedder: &dyn Embedder,
    chat: &dyn ChatModel,
    model: Option<&str>,
) -> Result<Answer> {
    let query_vectors = embedder
        .embed_batch(&[query.to_string()])
        .await
        .map_err(|e| match e {
            LlmError::MissingApiKey(name) => {
                SageError::Config(ConfigError::MissingApiKey(name.to_string()))
            }
            other => SageError::Embedding(other.to_string()),
        })?;
    let query_vector = query_vectors
        .first()
        .ok_or_else(|| SageError::Embedding("embedder returned no vector for query".to_string()))?;

    let hits = index.search(query_vector, k);
    tracing::debug!(
        "Retrieved {} chunks for query against {}",
        hits.len(),
        index.seed_url()
    );

    let mut sources: Vec<String> = Vec::new();
    for hit in &hits {
        let url = &hit.chunk.metadata.source_url;
        if !sources.iter().any(|s| s == url) {
            sources.push(url.clone());
        }
    }

    let context = hits
        .iter()
        .map(|hit| hit.chunk.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");
    let prompt = build_prompt(&context, query);

    let answer = chat.complete(&prompt, model).await.map_err(|e| match e {
        LlmError::MissingApiKey(name) => {
            SageError::Config(ConfigError::MissingApiKey(name.to_string()))
        }
        other => SageError::Generation(other.to_string()),
    })?;

    Ok(Answer { answer, sources })
}

/// Builds the grounded prompt sent to the chat model
fn build_prompt(context: &str, question: &str) -> String {
    format!(
        "You are an AI assistant that answers questions based on the content of \
         a specific webpage. Use the following context to answer the question:\n\n\
         {context}\n\n\
         Question: {question}\n\n\
         Provide a brief answer based solely on the provided context. If the \
         context does not provide enough information, indicate that no answer \
         could be determined."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::DocumentMetadata;
    use crate::index::Chunk;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::Arc;
    use std::sync::Mutex;

    struct StubEmbedder {
        vector: Vec<f32>,
    }

    #[async_trait]
    impl Embedder for StubEmbedder {
        async fn embed_batch(
            &self,
            texts: &[String],
        ) -> std::result::Result<Vec<Vec<f32>>, LlmError> {
            Ok(texts.iter().map(|_| self.vector.clone()).collect())
        }
    }

    struct KeylessEmbedder;

    #[async_trait]
    impl Embedder for KeylessEmbedder {
        async fn embed_batch(&self, _: &[String]) -> std::result::Result<Vec<Vec<f32>>, LlmError> {
            Err(LlmError::MissingApiKey("OPENAI_API_KEY"))
        }
    }

    /// Echoes the prompt back and records what it was asked
    struct RecordingChat {
        prompts: Mutex<Vec<String>>,
    }

    impl RecordingChat {
        fn new() -> Self {
            Self {
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ChatModel for RecordingChat {
        async fn complete(
            &self,
            prompt: &str,
            _model: Option<&str>,
        ) -> std::result::Result<String, LlmError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok("stub answer".to_string())
        }
    }

    fn chunk(text: &str, source: &str, embedding_hint: f32) -> (Chunk, Vec<f32>) {
        (
            Chunk {
                text: text.to_string(),
                metadata: Arc::new(DocumentMetadata {
                    source_url: source.to_string(),
                    depth: 0,
                    title: None,
                    content_type: None,
                    crawl_time: Utc::now(),
                }),
                overlap_with_previous: 0,
            },
            vec![embedding_hint, 1.0 - embedding_hint],
        )
    }

    fn index_from(parts: Vec<(Chunk, Vec<f32>)>) -> CorpusIndex {
        let (chunks, embeddings): (Vec<_>, Vec<_>) = parts.into_iter().unzip();
        CorpusIndex::new("https://example.com".to_string(), chunks, embeddings)
    }

    #[tokio::test]
    async fn test_context_and_question_in_prompt() {
        let index = index_from(vec![
            chunk("rust is a systems language", "https://example.com/a", 1.0),
            chunk("unrelated text", "https://example.com/b", 0.0),
        ]);
        let chat = RecordingChat::new();
        let result = answer(
            &index,
            "what is rust?",
            1,
            &StubEmbedder {
                vector: vec![1.0, 0.0],
            },
            &chat,
            None,
        )
        .await
        .unwrap();

        assert_eq!(result.answer, "stub answer");
        let prompts = chat.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("rust is a systems language"));
        assert!(prompts[0].contains("Question: what is rust?"));
        assert!(!prompts[0].contains("unrelated text"));
    }

    #[tokio::test]
    async fn test_sources_deduped_in_rank_order() {
        let index = index_from(vec![
            chunk("first chunk", "https://example.com/page", 1.0),
            chunk("second chunk", "https://example.com/page", 0.9),
            chunk("other page", "https://example.com/other", 0.8),
        ]);
        let result = answer(
            &index,
            "anything",
            3,
            &StubEmbedder {
                vector: vec![1.0, 0.0],
            },
            &RecordingChat::new(),
            None,
        )
        .await
        .unwrap();

        assert_eq!(
            result.sources,
            vec![
                "https://example.com/page".to_string(),
                "https://example.com/other".to_string()
            ]
        );
    }

    #[tokio::test]
    async fn test_deterministic_for_fixed_inputs() {
        let index = index_from(vec![
            chunk("alpha", "https://example.com/a", 0.7),
            chunk("beta", "https://example.com/b", 0.3),
        ]);
        let embedder = StubEmbedder {
            vector: vec![0.6, 0.4],
        };
        let first = answer(&index, "q", 2, &embedder, &RecordingChat::new(), None)
            .await
            .unwrap();
        let second = answer(&index, "q", 2, &embedder, &RecordingChat::new(), None)
            .await
            .unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_missing_key_maps_to_config_error() {
        let index = index_from(vec![chunk("text", "https://example.com/a", 1.0)]);
        let result = answer(
            &index,
            "q",
            1,
            &KeylessEmbedder,
            &RecordingChat::new(),
            None,
        )
        .await;
        assert!(matches!(
            result,
            Err(SageError::Config(ConfigError::MissingApiKey(_)))
        ));
    }
}
