//! Upstream page fetching.
//!
//! One GET per conversion, browser-like headers, a hard timeout and a body
//! size cap. No retries; callers decide whether to try again.

use futures::StreamExt;
use reqwest::Client;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue, UPGRADE_INSECURE_REQUESTS};
use std::time::Duration;
use thiserror::Error;

use crate::config::ServiceConfig;
use crate::utils::constants::{ACCEPT_LANGUAGE as ACCEPT_LANGUAGE_VALUE, HTML_ACCEPT};
use crate::utils::is_valid_url;

/// Errors raised while fetching a page
#[derive(Debug, Error)]
pub enum FetchError {
    /// Upstream answered with a non-success status
    #[error("HTTP {status}")]
    Http { status: u16 },

    /// No complete response within the configured timeout
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Connection, TLS, redirect or body decoding failure
    #[error("Network error: {0}")]
    Transport(#[source] reqwest::Error),

    /// Not an absolute http(s) URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Body exceeded the configured size limit
    #[error("Response body exceeds {limit} bytes")]
    TooLarge { limit: usize },
}

impl FetchError {
    /// HTTP status returned by upstream, if that is what failed
    #[must_use]
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            Self::Http { status } => Some(*status),
            _ => None,
        }
    }
}

/// HTTP client for upstream pages
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    timeout: Duration,
    max_body_bytes: usize,
}

impl HttpFetcher {
    /// Build a fetcher from the service configuration.
    ///
    /// # Errors
    ///
    /// [`FetchError::Transport`] if the TLS backend cannot be initialized.
    pub fn new(config: &ServiceConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(HTML_ACCEPT));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANGUAGE_VALUE));
        headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));

        let client = Client::builder()
            .user_agent(config.user_agent())
            .default_headers(headers)
            .timeout(config.fetch_timeout())
            .build()
            .map_err(FetchError::Transport)?;

        Ok(Self {
            client,
            timeout: config.fetch_timeout(),
            max_body_bytes: config.max_body_bytes(),
        })
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// GET `url` and return the body as text.
    ///
    /// Invalid UTF-8 is replaced rather than rejected.
    ///
    /// # Errors
    ///
    /// See [`FetchError`]. A timeout anywhere in the exchange, including
    /// while the body streams, is reported as [`FetchError::Timeout`].
    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        if !is_valid_url(url) {
            return Err(FetchError::InvalidUrl(url.to_string()));
        }

        tracing::debug!(url, "Fetching page");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            tracing::info!(url, status = status.as_u16(), "Upstream returned error status");
            return Err(FetchError::Http {
                status: status.as_u16(),
            });
        }

        let expected = response.content_length().unwrap_or(0);
        if expected > self.max_body_bytes as u64 {
            return Err(FetchError::TooLarge {
                limit: self.max_body_bytes,
            });
        }

        let mut buffer = Vec::with_capacity(usize::try_from(expected).unwrap_or(0));
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| self.classify(e))?;
            if buffer.len() + chunk.len() > self.max_body_bytes {
                return Err(FetchError::TooLarge {
                    limit: self.max_body_bytes,
                });
            }
            buffer.extend_from_slice(&chunk);
        }

        tracing::debug!(url, bytes = buffer.len(), "Fetched page");
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    fn classify(&self, error: reqwest::Error) -> FetchError {
        if error.is_timeout() {
            FetchError::Timeout(self.timeout)
        } else {
            FetchError::Transport(error)
        }
    }
}
