//! HTTP fetching.
//!
//! Both the page and every image go through the [`Fetch`] trait so that the
//! transport can be swapped (see `testing::StaticFetcher`). [`HttpFetcher`]
//! is the `reqwest` implementation used by default.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::options::Options;

/// Errors surfaced by a [`Fetch`] implementation.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// The server answered with a non-success status.
    #[error("HTTP status {status}")]
    Status { status: u16 },

    /// The request did not complete in time.
    #[error("request timed out")]
    Timeout,

    /// The body exceeded the configured size limit.
    #[error("response body larger than {limit} bytes")]
    TooLarge { limit: usize },

    /// Connection, TLS, redirect or body-read failure.
    #[error("transport error: {0}")]
    Transport(String),
}

/// A successfully fetched resource.
#[derive(Debug, Clone, Default)]
pub struct Fetched {
    /// Final URL after redirects.
    pub url: String,
    pub status: u16,
    /// Raw `Content-Type` header value.
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl Fetched {
    /// Media type without parameters, lowercased (`image/svg+xml`).
    #[must_use]
    pub fn media_type(&self) -> Option<String> {
        self.content_type.as_deref().map(|ct| {
            ct.split(';')
                .next()
                .unwrap_or_default()
                .trim()
                .to_ascii_lowercase()
        })
    }
}

/// Fetch a URL and return its body.
///
/// Implementations return `Err(FetchError::Status { .. })` for non-success
/// statuses so callers can tell "the server said no" from transport failures.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Fetched, FetchError>;
}

/// `reqwest`-backed fetcher.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    max_body_bytes: usize,
}

impl HttpFetcher {
    /// Builds a client honouring the timeout, redirect and user-agent options.
    pub fn new(options: &Options) -> Result<Self, crate::Error> {
        let client = reqwest::Client::builder()
            .timeout(options.fetch_timeout)
            .connect_timeout(options.fetch_timeout.min(Duration::from_secs(10)))
            .redirect(reqwest::redirect::Policy::limited(options.max_redirects))
            .user_agent(options.user_agent.clone())
            .build()
            .map_err(|e| crate::Error::Client(e.to_string()))?;

        Ok(Self {
            client,
            max_body_bytes: options.max_body_bytes,
        })
    }

    /// Use an existing client (shared connection pool, custom TLS, ...).
    #[must_use]
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Fetched, FetchError> {
        debug!(url = %url, "HTTP fetch starting");
        let response = self.client.get(url).send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        if let Some(length) = response.content_length() {
            if usize::try_from(length).map_or(true, |len| len > self.max_body_bytes) {
                return Err(FetchError::TooLarge {
                    limit: self.max_body_bytes,
                });
            }
        }

        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string);

        let body = response.bytes().await.map_err(map_reqwest_error)?;
        if body.len() > self.max_body_bytes {
            return Err(FetchError::TooLarge {
                limit: self.max_body_bytes,
            });
        }

        Ok(Fetched {
            url: final_url,
            status: status.as_u16(),
            content_type,
            body: body.to_vec(),
        })
    }
}

fn map_reqwest_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else if let Some(status) = e.status() {
        FetchError::Status {
            status: status.as_u16(),
        }
    } else {
        FetchError::Transport(e.to_string())
    }
}
