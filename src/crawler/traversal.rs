//! Traversal engine - bounded depth-first crawl
//!
//! Drives the fetcher and the page extractor over a site's link graph:
//! an explicit stack frontier (most-recently-discovered link first), a
//! visited set as the sole deduplication gate, and hard page-count and depth
//! bounds. Single-page failures are logged and absorbed; they never abort the
//! crawl.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use url::Url;

use crate::crawler::extractor::{extract, Document};
use crate::crawler::fetcher::{FetchError, Fetcher, RenderedFallback};
use crate::url::same_origin;

/// Per-crawl policy knobs
///
/// Defaults come from the crawler configuration; individual crawl requests
/// may override depth and page limits and supply a selector config.
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    /// Links discovered beyond this depth are not followed
    pub max_depth: u32,

    /// Hard bound on the number of pages visited
    pub max_pages: usize,

    /// Full-page text shorter than this is not indexed
    pub min_content_length: usize,

    /// Restrict the traversal to the seed URL's host
    pub same_origin: bool,

    /// Optional mapping of content-type label to CSS selector, applied to
    /// every fetched page
    pub selector_config: Option<HashMap<String, String>>,

    /// Fetch every page through the rendered-fetch collaborator
    pub use_rendered_fetch: bool,

    /// Retry blocked pages through the rendered-fetch collaborator
    pub fallback_to_rendered: bool,
}

impl CrawlOptions {
    /// Builds options from the configured crawler defaults
    pub fn from_config(config: &crate::config::CrawlerConfig) -> Self {
        Self {
            max_depth: config.max_depth,
            max_pages: config.max_pages,
            min_content_length: config.min_content_length,
            same_origin: config.same_origin,
            selector_config: None,
            use_rendered_fetch: false,
            fallback_to_rendered: false,
        }
    }
}

/// Result of a completed crawl
///
/// An empty document set is a valid outcome (every fetch failed or every page
/// was too thin), reported to the caller as a warning rather than an error.
#[derive(Debug)]
pub struct CrawlOutcome {
    /// Extracted documents in traversal order
    pub documents: Vec<Document>,

    /// Number of URLs visited (dequeued and processed)
    pub pages_visited: usize,
}

/// Bounded depth-first traversal over a site's link graph
pub struct TraversalEngine {
    fetcher: Arc<dyn Fetcher>,
    rendered: Option<RenderedFallback>,
}

impl TraversalEngine {
    /// Creates an engine over the given fetcher and an optional rendered-fetch
    /// collaborator used for challenge fallback
    pub fn new(fetcher: Arc<dyn Fetcher>, rendered: Option<RenderedFallback>) -> Self {
        Self { fetcher, rendered }
    }

    /// Crawls the site reachable from `seed`, returning extracted documents
    ///
    /// # Algorithm
    ///
    /// 1. Seed the frontier stack with `(seed, 0)`.
    /// 2. Pop the most recently pushed entry; skip it when already visited or
    ///    deeper than `max_depth`.
    /// 3. Mark it visited, fetch, extract text and selector documents.
    /// 4. When shallower than `max_depth`, push each resolved outbound link
    ///    not yet visited at `depth + 1`. Duplicate frontier entries are
    ///    tolerated; the visited check at pop time is the only dedup gate.
    /// 5. Stop when the frontier is exhausted or `max_pages` URLs have been
    ///    visited.
    pub async fn crawl(&self, seed: &Url, options: &CrawlOptions) -> CrawlOutcome {
        let mut visited: HashSet<String> = HashSet::new();
        let mut frontier: Vec<(Url, u32)> = vec![(seed.clone(), 0)];
        let mut documents: Vec<Document> = Vec::new();

        tracing::info!(
            "Crawling {} with max depth {} and max pages {}",
            seed,
            options.max_depth,
            options.max_pages
        );

        while visited.len() < options.max_pages {
            let Some((url, depth)) = frontier.pop() else {
                break;
            };

            if visited.contains(url.as_str()) || depth > options.max_depth {
                continue;
            }

            tracing::debug!("Processing {} (depth: {})", url, depth);
            visited.insert(url.as_str().to_string());

            let html = match self.fetch_page(&url, options).await {
                Ok(body) => body,
                Err(e) => {
                    tracing::warn!("Failed to fetch {}: {}", url, e);
                    continue;
                }
            };

            let page = extract(
                &html,
                &url,
                depth,
                options.min_content_length,
                options.selector_config.as_ref(),
            );

            if let Some(doc) = page.document {
                documents.push(doc);
            }
            documents.extend(page.selector_documents);

            // Only follow links when the next level is still within bounds
            if depth < options.max_depth {
                for link in page.links {
                    if options.same_origin && !same_origin(seed, &link) {
                        continue;
                    }
                    if !visited.contains(link.as_str()) {
                        frontier.push((link, depth + 1));
                    }
                }
            }
        }

        tracing::info!(
            "Crawling completed. Processed {} pages, extracted {} documents",
            visited.len(),
            documents.len()
        );

        CrawlOutcome {
            documents,
            pages_visited: visited.len(),
        }
    }

    /// Fetches a page, honoring the rendered-fetch policy
    ///
    /// When `use_rendered_fetch` is set and a collaborator exists, every page
    /// goes through it. Otherwise the HTTP fetcher runs first, and a
    /// `Blocked` failure is retried through the collaborator when
    /// `fallback_to_rendered` is set.
    async fn fetch_page(&self, url: &Url, options: &CrawlOptions) -> Result<String, FetchError> {
        if options.use_rendered_fetch {
            match &self.rendered {
                Some(rendered) => return rendered.fetch(url).await,
                None => {
                    tracing::debug!(
                        "Rendered fetch requested for {} but no collaborator is configured; \
                         using HTTP",
                        url
                    );
                }
            }
        }

        match self.fetcher.fetch(url).await {
            Err(FetchError::Blocked { url: blocked }) if options.fallback_to_rendered => {
                match &self.rendered {
                    Some(rendered) => {
                        tracing::warn!(
                            "Bot challenge at {}; retrying through rendered fetch",
                            blocked
                        );
                        rendered.fetch(url).await
                    }
                    None => Err(FetchError::Blocked { url: blocked }),
                }
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;

    /// In-memory site: URL path -> HTML body. Unknown URLs fail the fetch.
    struct StubFetcher {
        pages: HashMap<String, String>,
    }

    impl StubFetcher {
        fn new(pages: Vec<(&str, &str)>) -> Self {
            Self {
                pages: pages
                    .into_iter()
                    .map(|(u, b)| (u.to_string(), b.to_string()))
                    .collect(),
            }
        }
    }

    #[async_trait]
    impl Fetcher for StubFetcher {
        async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
            self.pages
                .get(url.as_str())
                .cloned()
                .ok_or_else(|| FetchError::Status {
                    url: url.to_string(),
                    status: 404,
                })
        }
    }

    fn options(max_depth: u32, max_pages: usize) -> CrawlOptions {
        CrawlOptions {
            max_depth,
            max_pages,
            min_content_length: 1,
            same_origin: true,
            selector_config: None,
            use_rendered_fetch: false,
            fallback_to_rendered: false,
        }
    }

    fn page(body: &str) -> String {
        format!("<html><body>{}</body></html>", body)
    }

    fn seed() -> Url {
        Url::parse("https://example.test/a").unwrap()
    }

    #[tokio::test]
    async fn test_seed_links_followed_one_level() {
        let fetcher = StubFetcher::new(vec![
            (
                "https://example.test/a",
                &page(r#"page a <a href="/b">b</a> <a href="/c">c</a>"#),
            ),
            (
                "https://example.test/b",
                &page(r#"page b <a href="/d">d</a>"#),
            ),
            ("https://example.test/c", &page("page c")),
            ("https://example.test/d", &page("page d")),
        ]);
        let engine = TraversalEngine::new(Arc::new(fetcher), None);

        let outcome = engine.crawl(&seed(), &options(1, 50)).await;

        // a at depth 0, b and c at depth 1; d (depth 2) is never followed
        assert_eq!(outcome.pages_visited, 3);
        let sources: Vec<&str> = outcome
            .documents
            .iter()
            .map(|d| d.metadata.source_url.as_str())
            .collect();
        assert!(sources.contains(&"https://example.test/a"));
        assert!(sources.contains(&"https://example.test/b"));
        assert!(sources.contains(&"https://example.test/c"));
        assert!(!sources.contains(&"https://example.test/d"));

        for doc in &outcome.documents {
            let expected = if doc.metadata.source_url.ends_with("/a") {
                0
            } else {
                1
            };
            assert_eq!(doc.metadata.depth, expected);
            assert!(doc.metadata.depth <= 1);
        }
    }

    #[tokio::test]
    async fn test_depth_first_order() {
        // a links to b then c; stack discipline explores c before b
        let fetcher = StubFetcher::new(vec![
            (
                "https://example.test/a",
                &page(r#"page a <a href="/b">b</a> <a href="/c">c</a>"#),
            ),
            ("https://example.test/b", &page("page b")),
            ("https://example.test/c", &page("page c")),
        ]);
        let engine = TraversalEngine::new(Arc::new(fetcher), None);

        let outcome = engine.crawl(&seed(), &options(1, 50)).await;
        let sources: Vec<&str> = outcome
            .documents
            .iter()
            .map(|d| d.metadata.source_url.as_str())
            .collect();
        assert_eq!(
            sources,
            vec![
                "https://example.test/a",
                "https://example.test/c",
                "https://example.test/b"
            ]
        );
    }

    #[tokio::test]
    async fn test_no_outbound_links_single_visit() {
        let fetcher = StubFetcher::new(vec![("https://example.test/a", &page("lonely page"))]);
        let engine = TraversalEngine::new(Arc::new(fetcher), None);

        let outcome = engine.crawl(&seed(), &options(1, 50)).await;
        assert_eq!(outcome.pages_visited, 1);
        assert_eq!(outcome.documents.len(), 1);
    }

    #[tokio::test]
    async fn test_all_fetches_fail_is_empty_not_fatal() {
        let fetcher = StubFetcher::new(vec![]);
        let engine = TraversalEngine::new(Arc::new(fetcher), None);

        let outcome = engine.crawl(&seed(), &options(2, 50)).await;
        assert_eq!(outcome.pages_visited, 1);
        assert!(outcome.documents.is_empty());
    }

    #[tokio::test]
    async fn test_page_cap_enforced() {
        // A chain long enough to exceed the cap
        let fetcher = StubFetcher::new(vec![
            ("https://example.test/a", &page(r#"<a href="/p1">1</a>"#)),
            ("https://example.test/p1", &page(r#"x <a href="/p2">2</a>"#)),
            ("https://example.test/p2", &page(r#"x <a href="/p3">3</a>"#)),
            ("https://example.test/p3", &page(r#"x <a href="/p4">4</a>"#)),
            ("https://example.test/p4", &page("x")),
        ]);
        let engine = TraversalEngine::new(Arc::new(fetcher), None);

        let outcome = engine.crawl(&seed(), &options(10, 3)).await;
        assert_eq!(outcome.pages_visited, 3);
    }

    #[tokio::test]
    async fn test_cycles_do_not_revisit() {
        let fetcher = StubFetcher::new(vec![
            (
                "https://example.test/a",
                &page(r#"page a <a href="/b">b</a>"#),
            ),
            (
                "https://example.test/b",
                &page(r#"page b <a href="/a">back</a> <a href="/b">self</a>"#),
            ),
        ]);
        let engine = TraversalEngine::new(Arc::new(fetcher), None);

        let outcome = engine.crawl(&seed(), &options(5, 50)).await;
        assert_eq!(outcome.pages_visited, 2);
        assert_eq!(outcome.documents.len(), 2);
    }

    #[tokio::test]
    async fn test_thin_page_links_still_followed() {
        let mut opts = options(1, 50);
        opts.min_content_length = 100;
        // Seed text is well under 100 chars but links out to a fat page
        let long_body = "long content ".repeat(20);
        let fetcher = StubFetcher::new(vec![
            (
                "https://example.test/a",
                &page(r#"thin <a href="/fat">fat</a>"#),
            ),
            ("https://example.test/fat", &page(&long_body)),
        ]);
        let engine = TraversalEngine::new(Arc::new(fetcher), None);

        let outcome = engine.crawl(&seed(), &opts).await;
        assert_eq!(outcome.pages_visited, 2);
        assert_eq!(outcome.documents.len(), 1);
        assert_eq!(
            outcome.documents[0].metadata.source_url,
            "https://example.test/fat"
        );
    }

    #[tokio::test]
    async fn test_same_origin_default_keeps_traversal_on_host() {
        let fetcher = StubFetcher::new(vec![
            (
                "https://example.test/a",
                &page(r#"page a <a href="https://elsewhere.test/x">away</a> <a href="/b">b</a>"#),
            ),
            ("https://example.test/b", &page("page b")),
            ("https://elsewhere.test/x", &page("offsite")),
        ]);
        let engine = TraversalEngine::new(Arc::new(fetcher), None);

        let outcome = engine.crawl(&seed(), &options(1, 50)).await;
        assert_eq!(outcome.pages_visited, 2);

        let mut opts = options(1, 50);
        opts.same_origin = false;
        let fetcher = StubFetcher::new(vec![
            (
                "https://example.test/a",
                &page(r#"page a <a href="https://elsewhere.test/x">away</a>"#),
            ),
            ("https://elsewhere.test/x", &page("offsite")),
        ]);
        let engine = TraversalEngine::new(Arc::new(fetcher), None);
        let outcome = engine.crawl(&seed(), &opts).await;
        assert_eq!(outcome.pages_visited, 2);
    }

    struct BlockedFetcher;

    #[async_trait]
    impl Fetcher for BlockedFetcher {
        async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
            Err(FetchError::Blocked {
                url: url.to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_blocked_page_falls_back_to_rendered() {
        let rendered = RenderedFallback::new(
            Arc::new(StubFetcher::new(vec![(
                "https://example.test/a",
                &page("rendered content"),
            )])),
            1,
        );
        let engine = TraversalEngine::new(Arc::new(BlockedFetcher), Some(rendered));

        let mut opts = options(0, 50);
        opts.fallback_to_rendered = true;
        let outcome = engine.crawl(&seed(), &opts).await;
        assert_eq!(outcome.documents.len(), 1);
        assert!(outcome.documents[0].text.contains("rendered content"));
    }

    #[tokio::test]
    async fn test_blocked_page_without_fallback_is_skipped() {
        let engine = TraversalEngine::new(Arc::new(BlockedFetcher), None);
        let outcome = engine.crawl(&seed(), &options(0, 50)).await;
        assert_eq!(outcome.pages_visited, 1);
        assert!(outcome.documents.is_empty());
    }
}
