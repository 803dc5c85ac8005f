//! Page extraction
//!
//! Turns raw markup into a plain-text [`Document`] with structured metadata,
//! collects the page's outbound links, and optionally runs selector-based
//! extraction producing additional documents tagged with a content-type
//! label.

use chrono::{DateTime, Utc};
use scraper::{Html, Selector};
use std::collections::HashMap;
use url::Url;

/// Metadata recorded for every extracted document
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentMetadata {
    /// URL of the page this document came from
    pub source_url: String,

    /// Traversal depth at which the page was visited (seed = 0)
    pub depth: u32,

    /// Page title, when the page has one
    pub title: Option<String>,

    /// Content-type label from selector-based extraction, absent for the
    /// full-page text document
    pub content_type: Option<String>,

    /// When the page was crawled
    pub crawl_time: DateTime<Utc>,
}

/// An immutable unit of extracted text plus its provenance
#[derive(Debug, Clone)]
pub struct Document {
    pub text: String,
    pub metadata: DocumentMetadata,
}

/// Everything extracted from a single fetched page
#[derive(Debug)]
pub struct ExtractedPage {
    /// The full-page text document, or `None` when the text was below the
    /// minimum content threshold
    pub document: Option<Document>,

    /// Documents produced by selector-based extraction, grouped by config
    /// entry
    pub selector_documents: Vec<Document>,

    /// Outbound links resolved against the page URL, in document order
    pub links: Vec<Url>,
}

/// Extracts text, metadata, selector matches, and links from raw markup
///
/// Parsing happens entirely within this call; the returned data owns all of
/// its strings, so callers are free to hold results across await points.
///
/// # Arguments
///
/// * `html` - The raw page markup
/// * `page_url` - URL the page was fetched from (base for relative links)
/// * `depth` - Traversal depth of the page
/// * `min_content_length` - Full-page text with fewer characters than this
///   is dropped
/// * `selector_config` - Optional mapping of content-type label to CSS selector
pub fn extract(
    html: &str,
    page_url: &Url,
    depth: u32,
    min_content_length: usize,
    selector_config: Option<&HashMap<String, String>>,
) -> ExtractedPage {
    let parsed = Html::parse_document(html);
    let crawl_time = Utc::now();

    let title = extract_title(&parsed);
    let text = extract_text(&parsed);

    // Pages with too little signal are not indexed, but their links are
    // still followed. The threshold counts characters, not bytes.
    let char_count = text.chars().count();
    let document = if char_count >= min_content_length {
        Some(Document {
            text,
            metadata: DocumentMetadata {
                source_url: page_url.to_string(),
                depth,
                title: title.clone(),
                content_type: None,
                crawl_time,
            },
        })
    } else {
        tracing::debug!(
            "Skipping {} as a document: only {} characters of text",
            page_url,
            char_count
        );
        None
    };

    let selector_documents = match selector_config {
        Some(config) => extract_with_selectors(&parsed, page_url, depth, crawl_time, config),
        None => Vec::new(),
    };

    let links = extract_links(&parsed, page_url);

    ExtractedPage {
        document,
        selector_documents,
        links,
    }
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Collects the document's text nodes into a single string
///
/// Each text node is trimmed and empty nodes are dropped; the survivors are
/// joined with single spaces.
fn extract_text(document: &Html) -> String {
    document
        .root_element()
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Runs selector-based extraction against an already parsed page
///
/// Each matched, non-empty element becomes its own document tagged with the
/// config entry's content-type label. A selector that fails to parse is
/// logged and skipped; it never aborts the page.
fn extract_with_selectors(
    document: &Html,
    page_url: &Url,
    depth: u32,
    crawl_time: DateTime<Utc>,
    config: &HashMap<String, String>,
) -> Vec<Document> {
    let mut documents = Vec::new();

    for (content_type, selector_str) in config {
        let selector = match Selector::parse(selector_str) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(
                    "Invalid selector {:?} for content type {:?}: {:?}",
                    selector_str,
                    content_type,
                    e
                );
                continue;
            }
        };

        for element in document.select(&selector) {
            let text = element
                .text()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(" ");
            if text.is_empty() {
                continue;
            }
            documents.push(Document {
                text,
                metadata: DocumentMetadata {
                    source_url: page_url.to_string(),
                    depth,
                    title: None,
                    content_type: Some(content_type.clone()),
                    crawl_time,
                },
            });
        }
    }

    documents
}

/// Extracts all followable links from the HTML document
fn extract_links(document: &Html, base_url: &Url) -> Vec<Url> {
    let mut links = Vec::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            if let Some(href) = element.value().attr("href") {
                if let Some(absolute_url) = resolve_link(href, base_url) {
                    links.push(absolute_url);
                }
            }
        }
    }

    links
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - empty hrefs and fragment-only links
/// - javascript:, mailto:, tel: schemes and data: URIs
/// - URLs that fail to resolve
/// - non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) => {
            if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
                Some(absolute_url)
            } else {
                None
            }
        }
        Err(_) => None,
    }
}
