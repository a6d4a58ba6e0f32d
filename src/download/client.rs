//! HTTP client wrapper for catalog and asset requests.
//!
//! This module provides the [`HttpFetch`] capability consumed by the engine
//! and [`HttpClient`], its reqwest-backed implementation with timeouts and an
//! optional session cookie jar.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::cookie::Jar;
use tracing::{debug, instrument, warn};
use url::Url;

use super::constants::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};
use super::error::DownloadError;
use crate::user_agent;

/// The "GET a URL, give me the whole body" capability.
///
/// Implementations are pre-authenticated; callers never deal with cookies.
/// The response status is not interpreted: any body the server sends back
/// is returned as the asset. Errors mean the request or the body read failed.
#[async_trait]
pub trait HttpFetch: Send + Sync {
    /// Fetches `url` and returns the full response body.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError`] on invalid URL, connect, timeout or body
    /// read failure.
    async fn get(&self, url: &str) -> Result<Vec<u8>, DownloadError>;
}

/// HTTP client for catalog and asset downloads.
///
/// This client is designed to be created once and shared across every
/// download task, taking advantage of connection pooling.
///
/// # Example
///
/// ```no_run
/// use sticker_core::download::{HttpClient, HttpFetch};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = HttpClient::new()?;
/// let bytes = client.get("https://example.com/smile.png").await?;
/// println!("fetched {} bytes", bytes.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Creates a new HTTP client with default timeouts and no cookies.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::Client`] if the reqwest builder fails.
    pub fn new() -> Result<Self, DownloadError> {
        Self::new_with_timeouts(CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS)
    }

    /// Creates a new HTTP client with explicit timeout values.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::Client`] if the reqwest builder fails.
    pub fn new_with_timeouts(
        connect_timeout_secs: u64,
        read_timeout_secs: u64,
    ) -> Result<Self, DownloadError> {
        build_client(None, connect_timeout_secs, read_timeout_secs)
    }

    /// Creates a new HTTP client that sends cookies from `cookie_jar`.
    ///
    /// Cookies in the jar are automatically attached to matching requests
    /// based on domain, path, and secure flag.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::Client`] if the reqwest builder fails.
    #[instrument(level = "debug", skip(cookie_jar))]
    pub fn with_cookie_jar(cookie_jar: Arc<Jar>) -> Result<Self, DownloadError> {
        Self::with_cookie_jar_and_timeouts(cookie_jar, CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS)
    }

    /// Creates a new HTTP client with a cookie jar and explicit timeout values.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::Client`] if the reqwest builder fails.
    #[instrument(level = "debug", skip(cookie_jar))]
    pub fn with_cookie_jar_and_timeouts(
        cookie_jar: Arc<Jar>,
        connect_timeout_secs: u64,
        read_timeout_secs: u64,
    ) -> Result<Self, DownloadError> {
        build_client(Some(cookie_jar), connect_timeout_secs, read_timeout_secs)
    }

    /// Returns a reference to the underlying reqwest client.
    #[must_use]
    pub fn inner(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl HttpFetch for HttpClient {
    #[instrument(skip(self), fields(url = %url))]
    async fn get(&self, url: &str) -> Result<Vec<u8>, DownloadError> {
        Url::parse(url).map_err(|_| DownloadError::invalid_url(url))?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DownloadError::from_request(url, e))?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "non-success status, keeping body anyway");
        }

        // A failed body read shares the attempt budget with connect failures.
        let body = response
            .bytes()
            .await
            .map_err(|e| DownloadError::from_request(url, e))?;

        debug!(bytes = body.len(), status = status.as_u16(), "response body read");
        Ok(body.to_vec())
    }
}

fn build_client(
    cookie_jar: Option<Arc<Jar>>,
    connect_timeout_secs: u64,
    read_timeout_secs: u64,
) -> Result<HttpClient, DownloadError> {
    let mut builder = Client::builder()
        .connect_timeout(Duration::from_secs(connect_timeout_secs))
        .timeout(Duration::from_secs(read_timeout_secs))
        .gzip(true)
        .user_agent(user_agent::default_user_agent());
    if let Some(jar) = cookie_jar {
        builder = builder.cookie_provider(jar);
    }
    let client = builder
        .build()
        .map_err(|source| DownloadError::Client { source })?;
    Ok(HttpClient { client })
}
