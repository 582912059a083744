use crate::url::matcher::is_excluded_protocol;
use crate::url::{Normalized, NormalizedLink};
use percent_encoding::percent_decode_str;

/// Separator between the scheme and the rest of an exportable URL
const SCHEME_SEPARATOR: &str = "://";

/// Normalizes a raw link URL into its canonical, exportable form
///
/// # Normalization Steps
///
/// 1. Split on the first `://` into protocol and location
/// 2. Reject the URL if the protocol starts with any excluded protocol
///    (case-insensitive)
/// 3. Split the location on the first `/` into domain and remainder
/// 4. Percent-decode the domain
/// 5. Reassemble as `protocol://domain/remainder` and lowercase everything
///
/// A URL without `://` is passed through lowercased and unsplit.
///
/// # Arguments
///
/// * `raw_url` - The URL as recorded in the source table
/// * `excluded_protocols` - Protocol prefixes that must never be exported
///
/// # Examples
///
/// ```
/// use linksync::url::{normalize_link, Normalized};
///
/// let excluded = vec!["ftp".to_string()];
/// match normalize_link("HTTP://Example.COM/Page", &excluded) {
///     Normalized::Link(link) => assert_eq!(link.canonical_url, "http://example.com/page"),
///     Normalized::Excluded => unreachable!(),
/// }
/// assert_eq!(normalize_link("ftp://files.example.com/", &excluded), Normalized::Excluded);
/// ```
pub fn normalize_link(raw_url: &str, excluded_protocols: &[String]) -> Normalized {
    let Some((protocol, location)) = raw_url.split_once(SCHEME_SEPARATOR) else {
        return Normalized::Link(NormalizedLink {
            canonical_url: raw_url.to_lowercase(),
            protocol: String::new(),
            domain: String::new(),
        });
    };

    if is_excluded_protocol(protocol, excluded_protocols) {
        return Normalized::Excluded;
    }

    let (domain, rest) = match location.split_once('/') {
        Some((domain, rest)) => (domain, Some(rest)),
        None => (location, None),
    };
    let domain = decode_domain(domain);

    let mut canonical = format!("{}{}{}", protocol, SCHEME_SEPARATOR, domain);
    if let Some(rest) = rest {
        canonical.push('/');
        canonical.push_str(rest);
    }
    let canonical_url = canonical.to_lowercase();

    Normalized::Link(NormalizedLink {
        canonical_url,
        protocol: protocol.to_lowercase(),
        domain: domain.to_lowercase(),
    })
}

/// Percent-decodes a domain until no escape sequence is left
///
/// Decoding to a fixed point keeps normalization idempotent for hosts that
/// were encoded more than once (`%2541` decodes to `%41`, then to `A`).
fn decode_domain(domain: &str) -> String {
    let mut current = domain.to_string();
    loop {
        let decoded = percent_decode_str(&current).decode_utf8_lossy().into_owned();
        if decoded == current {
            return current;
        }
        current = decoded;
    }
}

/// Converts a page title from its stored form to a display form
///
/// Page titles are stored with underscores in place of spaces.
pub fn convert_page_title(title: &str) -> String {
    title.replace('_', " ")
}

/// Removes the anchor portion (everything from the first `#`) of a URL
pub fn strip_fragment(url: &str) -> &str {
    match url.find('#') {
        Some(pos) => &url[..pos],
        None => url,
    }
}
