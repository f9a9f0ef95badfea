//! HTTP fetcher implementation
//!
//! This module owns the transport seam of the crawler:
//! - The `Transport` trait workers fetch through
//! - `HttpTransport`, the reqwest-backed implementation
//! - Content-Type classification shared by the transport and the worker
//! - Error classification for failed requests

use crate::config::{Config, FetchConfig, UserAgentConfig};
use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, redirect::Policy, Client, StatusCode};
use std::time::Duration;
use thiserror::Error;

/// Status, Content-Type and body of one HTTP exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    /// HTTP status code
    pub status: u16,

    /// Content-Type header value, `None` if absent or not valid text
    pub content_type: Option<String>,

    /// Page body. Only populated for crawlable HTML responses.
    pub body: String,
}

/// Failure to obtain a response at all
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Connection failed for {url}: {message}")]
    Connect { url: String, message: String },

    #[error("Request failed for {url}: {message}")]
    Request { url: String, message: String },

    #[error("Failed to read body of {url}: {message}")]
    Body { url: String, message: String },
}

/// Something that can fetch a URL
///
/// Workers only see this trait, so tests can substitute an in-memory site.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetches `url` and returns its status, Content-Type and (crawlable) body
    async fn fetch(&self, url: &str) -> Result<FetchResponse, TransportError>;
}

/// Returns true if a Content-Type header marks a crawlable HTML page
///
/// In strict mode the header must be exactly `text/html`. Otherwise the media type
/// before any `;` parameters is compared case-insensitively. A missing header is
/// never crawlable.
pub fn is_html_content_type(content_type: Option<&str>, strict: bool) -> bool {
    match content_type {
        Some(value) if strict => value == "text/html",
        Some(value) => value
            .split(';')
            .next()
            .map(|essence| essence.trim().eq_ignore_ascii_case("text/html"))
            .unwrap_or(false),
        None => false,
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The user agent configuration
/// * `fetch` - Timeouts and redirect limit
///
/// # Example
///
/// ```no_run
/// use sitewalk::config::{FetchConfig, UserAgentConfig};
/// use sitewalk::crawler::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default(), &FetchConfig::default()).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    fetch: &FetchConfig,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(Duration::from_secs(fetch.request_timeout_secs))
        .connect_timeout(Duration::from_secs(fetch.connect_timeout_secs))
        .redirect(Policy::limited(fetch.max_redirects))
        .gzip(true)
        .brotli(true)
        .build()
}

/// reqwest-backed `Transport`
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    strict_content_type: bool,
}

impl HttpTransport {
    /// Builds the transport from the crawl configuration
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let client = build_http_client(&config.user_agent, &config.fetch)?;
        Ok(Self::from_client(
            client,
            config.crawler.strict_content_type,
        ))
    }

    /// Wraps an existing client
    pub fn from_client(client: Client, strict_content_type: bool) -> Self {
        Self {
            client,
            strict_content_type,
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, TransportError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify_request_error(url, e))?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        // Bodies of responses the worker will not parse are left unread
        let crawlable = status == StatusCode::OK
            && is_html_content_type(content_type.as_deref(), self.strict_content_type);
        if !crawlable {
            return Ok(FetchResponse {
                status: status.as_u16(),
                content_type,
                body: String::new(),
            });
        }

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout {
                    url: url.to_string(),
                }
            } else {
                TransportError::Body {
                    url: url.to_string(),
                    message: e.to_string(),
                }
            }
        })?;

        Ok(FetchResponse {
            status: status.as_u16(),
            content_type,
            body,
        })
    }
}

/// Maps a reqwest send error onto the transport error taxonomy
fn classify_request_error(url: &str, e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout {
            url: url.to_string(),
        }
    } else if e.is_connect() {
        TransportError::Connect {
            url: url.to_string(),
            message: e.to_string(),
        }
    } else {
        TransportError::Request {
            url: url.to_string(),
            message: e.to_string(),
        }
    }
}
