/// Checks if a protocol matches any excluded protocol prefix
///
/// Matching is a case-insensitive prefix test, so an excluded entry of `"ftp"`
/// also excludes `"ftps"`.
///
/// # Arguments
///
/// * `protocol` - The scheme of the URL being considered
/// * `excluded_protocols` - The configured protocol prefixes
///
/// # Examples
///
/// ```
/// use linksync::url::is_excluded_protocol;
///
/// let excluded = vec!["mailto".to_string(), "ftp".to_string()];
/// assert!(is_excluded_protocol("MAILTO", &excluded));
/// assert!(is_excluded_protocol("ftps", &excluded));
/// assert!(!is_excluded_protocol("https", &excluded));
/// ```
pub fn is_excluded_protocol(protocol: &str, excluded_protocols: &[String]) -> bool {
    let protocol = protocol.to_ascii_lowercase();
    excluded_protocols
        .iter()
        .filter(|prefix| !prefix.is_empty())
        .any(|prefix| protocol.starts_with(&prefix.to_ascii_lowercase()))
}
