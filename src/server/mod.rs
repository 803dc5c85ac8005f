//! HTTP server
//!
//! Thin axum surface over the crawl and answer pipelines: four routes,
//! permissive CORS for browser frontends, request tracing. All domain state
//! lives in [`AppState`]; the router itself is stateless and cheap to
//! rebuild in tests.

mod handlers;
mod types;

pub use handlers::AppState;
pub use types::{
    ChatRequest, ChatResponse, ClearResponse, CrawlRequest, CrawlResponse, ErrorBody,
    HealthResponse,
};

use axum::routing::{delete, get, post};
use axum::Router;
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Builds the application router over shared state
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/crawl", post(handlers::crawl))
        .route("/chat", post(handlers::chat))
        .route("/health", get(handlers::health))
        .route("/clear/{*url}", delete(handlers::clear))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds `addr` and serves requests until the process exits
pub async fn start_server(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, build_router(state)).await
}
