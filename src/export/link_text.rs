//! Anchor text lookup
//!
//! Finds the visible text of the anchor that carries an exported link on its
//! source page.

use crate::url::{normalize_link, Normalized};
use scraper::{Html, Selector};

/// Returns the text of the first anchor on the page pointing at `canonical_url`
///
/// Each `href` is normalized the same way exported links are, so the match is
/// insensitive to case and to percent-encoding in the host. Anchors without
/// visible text are passed over.
///
/// # Example
///
/// ```
/// use linksync::export::find_link_text;
///
/// let html = r#"<p><a href="HTTPS://Example.com/Docs">The docs</a></p>"#;
/// let text = find_link_text(html, "https://example.com/docs", &[]);
/// assert_eq!(text, Some("The docs".to_string()));
/// ```
pub fn find_link_text(html: &str, canonical_url: &str, excluded_protocols: &[String]) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("a[href]").ok()?;

    document
        .select(&selector)
        .filter(|element| {
            element
                .value()
                .attr("href")
                .map(|href| matches_link(href, canonical_url, excluded_protocols))
                .unwrap_or(false)
        })
        .map(|element| collapse_whitespace(&element.text().collect::<String>()))
        .find(|text| !text.is_empty())
}

fn matches_link(href: &str, canonical_url: &str, excluded_protocols: &[String]) -> bool {
    match normalize_link(href.trim(), excluded_protocols) {
        Normalized::Link(link) => link.canonical_url == canonical_url,
        Normalized::Excluded => false,
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
