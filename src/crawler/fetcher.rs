//! Page fetching
//!
//! The traversal engine only needs `fetch(url) -> raw markup | failure`; this
//! module defines that capability boundary and the default HTTP
//! implementation. Sites behind a bot-challenge interstitial are reported as
//! `Blocked` so the engine can retry through a rendered-fetch collaborator
//! when one is configured.

use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Semaphore;
use url::Url;

use crate::config::CrawlerConfig;

/// Markers that identify a bot-challenge interstitial instead of real content
const CHALLENGE_MARKERS: [&str; 2] = ["Just a moment", "Enable JavaScript and cookies"];

/// Errors that can emerge while fetching a single page
///
/// All of these are non-fatal to a crawl: the traversal engine logs them and
/// moves on to the next frontier entry.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Bot challenge detected at {url}")]
    Blocked { url: String },

    #[error("Network error for {url}: {source}")]
    Network {
        url: String,
        source: reqwest::Error,
    },

    #[error("Rendered fetch failed for {url}: {message}")]
    Rendered { url: String, message: String },
}

/// Capability for retrieving the raw markup of a single URL
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches the page at `url` and returns its raw markup
    async fn fetch(&self, url: &Url) -> Result<String, FetchError>;
}

/// Default fetcher: a plain HTTP GET via reqwest
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Builds an HTTP fetcher from the crawler configuration
    ///
    /// The client carries the configured User-Agent, request and connect
    /// timeouts, and transparent gzip/brotli decompression.
    pub fn new(config: &CrawlerConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.fetch_timeout_secs))
            .connect_timeout(Duration::from_secs(config.fetch_timeout_secs.min(10)))
            .gzip(true)
            .brotli(true)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| classify_error(url, e))?;

        if CHALLENGE_MARKERS.iter().any(|m| body.contains(m)) {
            return Err(FetchError::Blocked {
                url: url.to_string(),
            });
        }

        Ok(body)
    }
}

fn classify_error(url: &Url, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Network {
            url: url.to_string(),
            source: error,
        }
    }
}

/// A rendered-fetch collaborator with a concurrency bound
///
/// Each rendered fetch may spin up an isolated rendering session on the
/// collaborator side, so the number of in-flight fetches is capped by a
/// semaphore. The inner fetcher is responsible for tearing its session down
/// on every exit path.
pub struct RenderedFallback {
    inner: Arc<dyn Fetcher>,
    permits: Arc<Semaphore>,
}

impl RenderedFallback {
    /// Wraps a rendered-fetch collaborator, allowing at most `max_concurrent`
    /// fetches in flight
    pub fn new(inner: Arc<dyn Fetcher>, max_concurrent: usize) -> Self {
        Self {
            inner,
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    /// Fetches through the collaborator once a permit is available
    pub async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| FetchError::Rendered {
                url: url.to_string(),
                message: "rendered fetch pool is closed".to_string(),
            })?;
        self.inner.fetch(url).await
    }
}
