//! Network fetch pipeline used by the strategies.
//!
//! ### Fetcher seam
//! - Strategies only see the [`Fetcher`] trait; any HTTP status counts as a
//!   settled fetch, only transport failures are errors.
//! - Aborts and timeouts surface as errors and follow each strategy's failure path.
//!
//! ### Limits
//! - Max redirects: 5
//! - Max body bytes: 5MB (configurable)
//! - Request timeout: 20s (configurable)

pub mod connectivity;
pub mod url;

use async_trait::async_trait;
use reqwest::{Client, Method, header};
use std::time::{Duration, Instant};

pub use connectivity::Connectivity;
pub use url::{UrlError, resolve};

use smarttask_core::{Error, InterceptedRequest, RequestMode, Response};

/// Performs the network leg of a request.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, request: &InterceptedRequest) -> Result<Response, Error>;
}

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "smarttask-sw/0.1")
    pub user_agent: String,

    /// Maximum response body size in bytes (default: 5MB)
    pub max_bytes: usize,

    /// Request timeout (default: 20s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "smarttask-sw/0.1".to_string(),
            max_bytes: 5 * 1024 * 1024,
            timeout: Duration::from_millis(20000),
            max_redirects: 5,
        }
    }
}

impl FetchConfig {
    /// Build from the application configuration.
    pub fn from_app(config: &smarttask_core::AppConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            max_bytes: config.max_bytes,
            timeout: config.timeout(),
            ..Default::default()
        }
    }
}

/// HTTP fetch client backed by reqwest.
pub struct FetchClient {
    http: Client,
    config: FetchConfig,
}

fn network_error(err: reqwest::Error) -> Error {
    if err.is_timeout() { Error::FetchTimeout(err.to_string()) } else { Error::Network(err.to_string()) }
}

fn accept_for(mode: RequestMode) -> &'static str {
    match mode {
        RequestMode::Navigate => "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        _ => "*/*",
    }
}

impl FetchClient {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::Network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }
}

#[async_trait]
impl Fetcher for FetchClient {
    /// Fetch a request, returning status, headers and the full body.
    async fn fetch(&self, request: &InterceptedRequest) -> Result<Response, Error> {
        let start = Instant::now();
        let method = Method::from_bytes(request.method.as_bytes())
            .map_err(|e| Error::InvalidInput(format!("invalid method {}: {e}", request.method)))?;

        let response = self
            .http
            .request(method, request.url.clone())
            .header(header::ACCEPT, accept_for(request.mode))
            .send()
            .await
            .map_err(network_error)?;

        let status = response.status();

        if let Some(len) = response.content_length()
            && len as usize > self.config.max_bytes
        {
            return Err(Error::FetchTooLarge(format!("{} bytes exceeds {}", len, self.config.max_bytes)));
        }

        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str().to_string(), v.to_string())))
            .collect();

        let bytes = response.bytes().await.map_err(network_error)?;

        if bytes.len() > self.config.max_bytes {
            return Err(Error::FetchTooLarge(format!("{} bytes exceeds {}", bytes.len(), self.config.max_bytes)));
        }

        tracing::debug!(
            "fetched {} -> {} in {}ms ({} bytes)",
            request.url,
            status.as_u16(),
            start.elapsed().as_millis(),
            bytes.len()
        );

        Ok(Response {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body: bytes,
        })
    }
}
