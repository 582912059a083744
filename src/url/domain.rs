/// Protocol and domain of a URL, used only for comparisons
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlParts {
    /// The scheme, as written
    pub protocol: String,

    /// The host segment, as written (may include a port or user info)
    pub domain: String,
}

impl UrlParts {
    /// Returns the key used for per-run domain deduplication
    pub fn domain_key(&self) -> String {
        self.domain.to_lowercase()
    }
}

/// Splits a URL into protocol and domain without rewriting it
///
/// The protocol is the run of ASCII letters immediately before the first `:`
/// that has one; any slashes after the colon are skipped, and the domain runs
/// up to the next `/`, `?` or `#`. Unlike
/// [`normalize_link`](crate::url::normalize_link), nothing is decoded or
/// lowercased, and schemes without `//` (such as `mailto:`) still yield a
/// domain.
///
/// # Returns
///
/// * `Some(UrlParts)` - The URL has a protocol and a non-empty domain
/// * `None` - The URL could not be split
///
/// # Examples
///
/// ```
/// use linksync::url::split_url;
///
/// let parts = split_url("https://Example.com/page").unwrap();
/// assert_eq!(parts.protocol, "https");
/// assert_eq!(parts.domain, "Example.com");
///
/// let parts = split_url("mailto:someone@example.com").unwrap();
/// assert_eq!(parts.protocol, "mailto");
/// assert_eq!(parts.domain, "someone@example.com");
///
/// assert!(split_url("no protocol here").is_none());
/// ```
pub fn split_url(url: &str) -> Option<UrlParts> {
    for (colon, _) in url.match_indices(':') {
        let before = &url[..colon];
        let protocol_start = before
            .char_indices()
            .rev()
            .take_while(|(_, c)| c.is_ascii_alphabetic())
            .last()
            .map(|(i, _)| i);

        let Some(start) = protocol_start else {
            continue;
        };

        let after = url[colon + 1..].trim_start_matches('/');
        let domain = after
            .split(|c: char| matches!(c, '/' | '?' | '#'))
            .next()
            .unwrap_or_default();
        if domain.is_empty() {
            continue;
        }

        return Some(UrlParts {
            protocol: url[start..colon].to_string(),
            domain: domain.to_string(),
        });
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_simple() {
        let parts = split_url("https://example.com/").unwrap();
        assert_eq!(parts.protocol, "https");
        assert_eq!(parts.domain, "example.com");
    }

    #[test]
    fn test_split_keeps_case() {
        let parts = split_url("HTTP://Example.COM/Page").unwrap();
        assert_eq!(parts.protocol, "HTTP");
        assert_eq!(parts.domain, "Example.COM");
        assert_eq!(parts.domain_key(), "example.com");
    }

    #[test]
    fn test_split_with_port() {
        let parts = split_url("http://127.0.0.1:8080/health").unwrap();
        assert_eq!(parts.protocol, "http");
        assert_eq!(parts.domain, "127.0.0.1:8080");
    }

    #[test]
    fn test_split_without_path() {
        let parts = split_url("https://example.com").unwrap();
        assert_eq!(parts.domain, "example.com");
    }

    #[test]
    fn test_split_stops_at_query_and_fragment() {
        for url in ["https://x.com?a=1", "https://x.com#top", "https://x.com/b"] {
            assert_eq!(split_url(url).unwrap().domain, "x.com", "{}", url);
        }
    }

    #[test]
    fn test_split_mailto() {
        let parts = split_url("mailto:info@example.com").unwrap();
        assert_eq!(parts.protocol, "mailto");
        assert_eq!(parts.domain, "info@example.com");
    }

    #[test]
    fn test_split_no_domain() {
        assert!(split_url("http://").is_none());
        assert!(split_url("http:///").is_none());
    }

    #[test]
    fn test_split_no_protocol() {
        assert!(split_url("example.com/page").is_none());
        assert!(split_url(":missing").is_none());
    }
}
