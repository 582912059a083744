//! HTTP liveness probing
//!
//! This module contains everything the health checker needs to call out to a
//! link and turn the response into a status row update:
//! - The `HttpProbe` interface and its reqwest implementation
//! - HEAD/GET method selection from the last recorded status
//! - Error message compilation from structured probe errors
//! - Redirect detection

mod errors;
mod fetcher;

pub use errors::{compile_error, ProbeErrorDetail};
pub use fetcher::{build_http_client, ReqwestProbe};

use async_trait::async_trait;

/// Status code recorded when a probe produced no HTTP status at all
pub const NO_STATUS_CODE: u16 = 999;

/// HTTP method used for a probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeMethod {
    Head,
    Get,
}

impl ProbeMethod {
    /// Chooses the probe method from the last recorded status code
    ///
    /// A link whose last check returned 300 or above is suspected broken and
    /// gets a full `GET`; everything else gets a cheap `HEAD`.
    pub fn for_last_status(last_status_code: u16) -> Self {
        if last_status_code >= 300 {
            Self::Get
        } else {
            Self::Head
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Head => "HEAD",
            Self::Get => "GET",
        }
    }
}

/// Raw outcome of one probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResponse {
    /// HTTP status, if one was received
    pub status_code: Option<u16>,

    /// URL after following redirects (the request URL if none were followed)
    pub final_url: String,

    /// Structured errors; empty when the response was successful
    pub errors: Vec<ProbeErrorDetail>,
}

impl ProbeResponse {
    /// Returns true if the probe got a 2xx response
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty() && self.status_code.is_some_and(|c| (200..300).contains(&c))
    }

    /// Status code to record, using the sentinel when none was received
    pub fn recorded_status(&self) -> u16 {
        match self.status_code {
            Some(code) if code > 0 => code,
            _ => NO_STATUS_CODE,
        }
    }

    /// Error text to record (empty for successful probes)
    pub fn recorded_error(&self) -> String {
        if self.is_ok() {
            String::new()
        } else {
            compile_error(&self.errors)
        }
    }
}

/// Interface for issuing liveness probes
///
/// Probes never fail: transport problems are reported inside the response.
#[async_trait]
pub trait HttpProbe: Send + Sync {
    async fn probe(&self, url: &str, method: ProbeMethod) -> ProbeResponse;
}

/// Returns the redirect target to record for a probe
///
/// The final URL counts as a redirect only if it differs from the request URL
/// ignoring case. Both URLs are also compared after URL parsing, so an added
/// root slash (`http://a.com` vs `http://a.com/`) is not a redirect.
///
/// # Examples
///
/// ```
/// use linksync::probe::detect_redirect;
///
/// assert_eq!(detect_redirect("http://a.com/x", "http://A.COM/X"), "");
/// assert_eq!(detect_redirect("http://a.com/x", "http://b.com/y"), "http://b.com/y");
/// ```
pub fn detect_redirect(request_url: &str, final_url: &str) -> String {
    if final_url.is_empty() || same_location(request_url, final_url) {
        String::new()
    } else {
        final_url.to_string()
    }
}

fn same_location(a: &str, b: &str) -> bool {
    if a.to_lowercase() == b.to_lowercase() {
        return true;
    }

    match (::url::Url::parse(a), ::url::Url::parse(b)) {
        (Ok(a), Ok(b)) => a.as_str().to_lowercase() == b.as_str().to_lowercase(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_selection() {
        assert_eq!(ProbeMethod::for_last_status(0), ProbeMethod::Head);
        assert_eq!(ProbeMethod::for_last_status(200), ProbeMethod::Head);
        assert_eq!(ProbeMethod::for_last_status(299), ProbeMethod::Head);
        assert_eq!(ProbeMethod::for_last_status(300), ProbeMethod::Get);
        assert_eq!(ProbeMethod::for_last_status(404), ProbeMethod::Get);
        assert_eq!(ProbeMethod::for_last_status(999), ProbeMethod::Get);
    }

    #[test]
    fn test_redirect_case_insensitive() {
        assert_eq!(detect_redirect("http://a.com/x", "http://A.COM/X"), "");
    }

    #[test]
    fn test_redirect_recorded() {
        assert_eq!(
            detect_redirect("http://a.com/x", "http://b.com/y"),
            "http://b.com/y"
        );
    }

    #[test]
    fn test_redirect_ignores_root_slash() {
        assert_eq!(detect_redirect("http://a.com", "http://a.com/"), "");
    }

    #[test]
    fn test_redirect_empty_final_url() {
        assert_eq!(detect_redirect("http://a.com/x", ""), "");
    }

    #[test]
    fn test_recorded_status_sentinel() {
        let response = ProbeResponse {
            status_code: None,
            final_url: String::new(),
            errors: vec![ProbeErrorDetail::new("http-timed-out", &["https://a.example/"])],
        };
        assert_eq!(response.recorded_status(), NO_STATUS_CODE);
        assert_eq!(response.recorded_error(), "http-timed-out: https://a.example/");
    }

    #[test]
    fn test_successful_probe_has_no_error() {
        let response = ProbeResponse {
            status_code: Some(204),
            final_url: "https://a.example/".to_string(),
            errors: Vec::new(),
        };
        assert!(response.is_ok());
        assert_eq!(response.recorded_status(), 204);
        assert_eq!(response.recorded_error(), "");
    }
}
