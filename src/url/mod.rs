//! URL handling module for Linksync
//!
//! This module provides link normalization for export, the comparison-only
//! protocol/domain split used by the health checker, and excluded-protocol
//! matching shared by both pipelines.

mod domain;
mod matcher;
mod normalize;

// Re-export main functions
pub use domain::{split_url, UrlParts};
pub use matcher::is_excluded_protocol;
pub use normalize::{convert_page_title, normalize_link, strip_fragment};

/// Canonical form of a link, derived from its raw URL
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedLink {
    /// Lowercased URL with a percent-decoded host
    pub canonical_url: String,

    /// The lowercased scheme (empty if the URL had no `://`)
    pub protocol: String,

    /// The lowercased, decoded host segment (empty if the URL had no `://`)
    pub domain: String,
}

/// Outcome of normalizing a raw URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Normalized {
    /// The URL is exportable
    Link(NormalizedLink),

    /// The URL uses an excluded protocol and must be dropped
    Excluded,
}

impl Normalized {
    /// Returns the normalized link, if the URL was not excluded
    pub fn into_link(self) -> Option<NormalizedLink> {
        match self {
            Self::Link(link) => Some(link),
            Self::Excluded => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_link() {
        let excluded = vec!["ftp".to_string()];
        assert!(normalize_link("https://example.com/", &excluded)
            .into_link()
            .is_some());
        assert!(normalize_link("ftp://example.com/", &excluded)
            .into_link()
            .is_none());
    }

    #[test]
    fn test_split_agrees_with_normalize_on_domain() {
        let excluded: Vec<String> = Vec::new();
        let raw = "https://Example.com/Path";
        let link = normalize_link(raw, &excluded).into_link().unwrap();
        let parts = split_url(raw).unwrap();
        assert_eq!(link.domain, parts.domain_key());
    }
}
