//! reqwest-backed probe
//!
//! Builds the HTTP client from the `[http]` configuration and classifies
//! transport failures into the structured errors recorded in the status
//! sheet.

use crate::config::HttpConfig;
use crate::probe::{HttpProbe, ProbeErrorDetail, ProbeMethod, ProbeResponse};
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client, Method, Proxy};
use std::time::Duration;

/// Maximum number of redirects followed by a probe
pub const MAX_REDIRECTS: usize = 10;

/// Builds the HTTP client used for probing
///
/// # Example
///
/// ```no_run
/// use linksync::config::HttpConfig;
/// use linksync::probe::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_secs(config.timeout))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true);

    if let Some(proxy) = &config.proxy {
        builder = builder.proxy(Proxy::all(proxy.as_str())?);
    }

    builder.build()
}

/// Probe that issues real HTTP requests
#[derive(Debug, Clone)]
pub struct ReqwestProbe {
    client: Client,
}

impl ReqwestProbe {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a probe from the `[http]` configuration
    pub fn from_config(config: &HttpConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(config)?))
    }
}

#[async_trait]
impl HttpProbe for ReqwestProbe {
    async fn probe(&self, url: &str, method: ProbeMethod) -> ProbeResponse {
        let method = match method {
            ProbeMethod::Head => Method::HEAD,
            ProbeMethod::Get => Method::GET,
        };

        match self.client.request(method, url).send().await {
            Ok(response) => {
                let status = response.status();
                let final_url = response.url().to_string();

                let errors = if status.is_success() {
                    Vec::new()
                } else {
                    vec![ProbeErrorDetail::new(
                        "http-bad-status",
                        &[
                            status.as_str(),
                            status.canonical_reason().unwrap_or_default(),
                        ],
                    )]
                };

                ProbeResponse {
                    status_code: Some(status.as_u16()),
                    final_url,
                    errors,
                }
            }
            Err(e) => {
                let final_url = e
                    .url()
                    .map(|u| u.to_string())
                    .unwrap_or_else(|| url.to_string());

                ProbeResponse {
                    status_code: e.status().map(|s| s.as_u16()),
                    final_url,
                    errors: vec![classify_error(&e, url)],
                }
            }
        }
    }
}

/// Maps a transport error to its recorded form
fn classify_error(e: &reqwest::Error, url: &str) -> ProbeErrorDetail {
    if e.is_timeout() {
        ProbeErrorDetail::new("http-timed-out", &[url])
    } else if e.is_connect() {
        ProbeErrorDetail::new("http-connect-error", &[root_cause(e).as_str()])
    } else {
        ProbeErrorDetail::new("http-request-error", &[root_cause(e).as_str()])
    }
}

/// Returns the description of the innermost error in the chain
fn root_cause(e: &reqwest::Error) -> String {
    let mut current: &dyn std::error::Error = e;
    while let Some(source) = current.source() {
        current = source;
    }
    current.to_string()
}
