//! URL helpers
//!
//! Host extraction and the same-origin test used by the traversal engine.

use url::Url;

/// Extracts the host from a URL, lowercased
///
/// # Arguments
///
/// * `url` - The URL to extract the host from
///
/// # Returns
///
/// * `Some(String)` - The lowercase host
/// * `None` - If the URL has no host
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sitesage::url::extract_host;
///
/// let url = Url::parse("https://Example.COM/path").unwrap();
/// assert_eq!(extract_host(&url), Some("example.com".to_string()));
/// ```
pub fn extract_host(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Checks whether two URLs share the same host (case-insensitive)
///
/// URLs without a host never match anything, including each other.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sitesage::url::same_origin;
///
/// let a = Url::parse("https://example.com/a").unwrap();
/// let b = Url::parse("https://EXAMPLE.com/b/c").unwrap();
/// let c = Url::parse("https://other.com/").unwrap();
/// assert!(same_origin(&a, &b));
/// assert!(!same_origin(&a, &c));
/// ```
pub fn same_origin(a: &Url, b: &Url) -> bool {
    match (extract_host(a), extract_host(b)) {
        (Some(ha), Some(hb)) => ha == hb,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_simple_host() {
        let url = Url::parse("https://example.com/").unwrap();
        assert_eq!(extract_host(&url), Some("example.com".to_string()));
    }

    #[test]
    fn test_extract_subdomain() {
        let url = Url::parse("https://blog.example.com/post").unwrap();
        assert_eq!(extract_host(&url), Some("blog.example.com".to_string()));
    }

    #[test]
    fn test_extract_with_port_drops_port() {
        let url = Url::parse("https://example.com:8080/").unwrap();
        assert_eq!(extract_host(&url), Some("example.com".to_string()));
    }

    #[test]
    fn test_extract_uppercase_converted_to_lowercase() {
        let url = Url::parse("https://EXAMPLE.COM/").unwrap();
        assert_eq!(extract_host(&url), Some("example.com".to_string()));
    }

    #[test]
    fn test_same_origin_ignores_path_and_case() {
        let a = Url::parse("https://Example.com/a?q=1").unwrap();
        let b = Url::parse("https://example.COM/deep/path").unwrap();
        assert!(same_origin(&a, &b));
    }

    #[test]
    fn test_subdomain_is_different_origin() {
        let a = Url::parse("https://example.com/").unwrap();
        let b = Url::parse("https://www.example.com/").unwrap();
        assert!(!same_origin(&a, &b));
    }
}
