//! HTTP request handlers

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::sync::Arc;
use url::Url;

use crate::config::Config;
use crate::index::{build_index, TextChunker};
use crate::llm::{ChatModel, Embedder};
use crate::rag;
use crate::registry::CorpusRegistry;
use crate::server::types::{
    ChatRequest, ChatResponse, ClearResponse, CrawlRequest, CrawlResponse, ErrorBody,
    HealthResponse,
};
use crate::{CrawlOptions, SageError, TraversalEngine};

/// Shared state behind every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub registry: Arc<CorpusRegistry>,
    pub engine: Arc<TraversalEngine>,
    pub chunker: Arc<TextChunker>,
    pub embedder: Arc<dyn Embedder>,
    pub chat: Arc<dyn ChatModel>,
}

/// `POST /crawl` - crawl a site and build its corpus index
///
/// Overwrites any existing index for the same seed URL. A crawl that yields
/// no indexable content is a `warning` response, not an error.
pub async fn crawl(
    State(state): State<AppState>,
    Json(request): Json<CrawlRequest>,
) -> Response {
    let seed = match Url::parse(&request.url) {
        Ok(url) => url,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, format!("Invalid URL: {e}")),
    };

    let mut options = CrawlOptions::from_config(&state.config.crawler);
    if let Some(depth) = request.max_depth {
        options.max_depth = depth;
    }
    if let Some(pages) = request.max_pages {
        options.max_pages = pages;
    }
    options.selector_config = request.selector_config;
    options.use_rendered_fetch = request.use_browser_fetch;
    options.fallback_to_rendered = request.fallback_to_browser;
    if request.wait_time.is_some() {
        tracing::debug!("wait_time only applies to browser-rendered fetches");
    }

    // The registry key is the parsed URL, so trailing-slash variants of the
    // same seed resolve to one corpus across crawl, chat and clear.
    let key = seed.to_string();
    let guard = state.registry.build_guard(&key).await;
    let _build = guard.lock().await;

    let outcome = state.engine.crawl(&seed, &options).await;
    if outcome.documents.is_empty() {
        tracing::warn!("Crawl of {} produced no indexable content", key);
        return (
            StatusCode::OK,
            Json(CrawlResponse {
                status: "warning".to_string(),
                message: format!("No content could be extracted from {}", request.url),
                chunks_count: 0,
                pages_crawled: outcome.pages_visited,
                documents_extracted: 0,
                content_preview: None,
            }),
        )
            .into_response();
    }

    let preview = outcome.documents.first().map(|doc| preview(&doc.text));
    let documents_extracted = outcome.documents.len();

    let index = match build_index(
        &key,
        &outcome.documents,
        &state.chunker,
        state.embedder.as_ref(),
    )
    .await
    {
        Ok(index) => index,
        Err(e) => {
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error processing website: {e}"),
            )
        }
    };

    let chunks_count = index.len();
    state.registry.put(key.clone(), index).await;
    tracing::info!(
        "Indexed {} with {} chunks from {} documents",
        key,
        chunks_count,
        documents_extracted
    );

    (
        StatusCode::OK,
        Json(CrawlResponse {
            status: "success".to_string(),
            message: format!("Website {} crawled and indexed", request.url),
            chunks_count,
            pages_crawled: outcome.pages_visited,
            documents_extracted,
            content_preview: preview,
        }),
    )
        .into_response()
}

/// `POST /chat` - answer a question against a crawled corpus
pub async fn chat(State(state): State<AppState>, Json(request): Json<ChatRequest>) -> Response {
    let key = normalize(&request.url);
    let Some(index) = state.registry.get(&key).await else {
        let err = SageError::CorpusNotFound {
            url: request.url.clone(),
        };
        return error_response(StatusCode::NOT_FOUND, format!("{err}."));
    };

    match rag::answer(
        &index,
        &request.query,
        state.config.retrieval.top_k,
        state.embedder.as_ref(),
        state.chat.as_ref(),
        request.model.as_deref(),
    )
    .await
    {
        Ok(answer) => (
            StatusCode::OK,
            Json(ChatResponse {
                answer: answer.answer,
                sources: answer.sources,
            }),
        )
            .into_response(),
        Err(e @ SageError::Config(_)) => {
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
        Err(e) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Error generating answer: {e}"),
        ),
    }
}

/// `GET /health` - liveness signal
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
    })
}

/// `DELETE /clear/{url}` - drop a crawled corpus
pub async fn clear(State(state): State<AppState>, Path(url): Path<String>) -> Response {
    let key = normalize(&url);
    if state.registry.remove(&key).await {
        tracing::info!("Cleared index for {}", key);
        (
            StatusCode::OK,
            Json(ClearResponse {
                status: "success".to_string(),
                message: format!("Cleared index for {url}"),
            }),
        )
            .into_response()
    } else {
        let err = SageError::CorpusNotFound { url };
        error_response(StatusCode::NOT_FOUND, format!("{err}."))
    }
}

/// Normalizes a raw URL string to the registry-key form
///
/// Unparseable input passes through unchanged; it simply never matches a
/// stored key.
fn normalize(raw: &str) -> String {
    Url::parse(raw)
        .map(|url| url.to_string())
        .unwrap_or_else(|_| raw.to_string())
}

/// First 200 characters of the extracted text, elided when longer
fn preview(text: &str) -> String {
    let mut chars = text.char_indices();
    match chars.nth(200) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

fn error_response(status: StatusCode, detail: String) -> Response {
    (status, Json(ErrorBody { detail })).into_response()
}
