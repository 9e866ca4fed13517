//! HTTP client abstraction for testability.
//!
//! All network access in the pipeline goes through the [`AsyncHttpClient`]
//! trait so that catalog queries, preview fetches and archive downloads can
//! be exercised against mock clients in tests.

use std::future::Future;
use std::path::Path;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{debug, trace, warn};

/// Basic-auth credentials for the imagery catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl Credentials {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }
}

/// Transport-level HTTP failures.
///
/// Status codes are *not* errors at this layer; callers inspect
/// [`HttpResponse::status`] and apply their own policy (e.g. the catalog
/// client treats 503 differently from other non-2xx responses).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HttpError {
    /// Connection/protocol failure before a response was received
    #[error("transport error: {0}")]
    Transport(String),

    /// The request exceeded its deadline
    #[error("request timed out: {0}")]
    Timeout(String),

    /// Local I/O failure while persisting a download
    #[error("I/O error: {0}")]
    Io(String),
}

/// A completed HTTP exchange: status code plus the full response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_service_unavailable(&self) -> bool {
        self.status == 503
    }
}

/// Trait for asynchronous HTTP operations used by the pipeline.
pub trait AsyncHttpClient: Send + Sync {
    /// Performs a GET request, optionally with basic authentication,
    /// buffering the whole body in memory.
    fn get(
        &self,
        url: &str,
        auth: Option<&Credentials>,
    ) -> impl Future<Output = Result<HttpResponse, HttpError>> + Send;

    /// Streams a GET response to `dest` without buffering it in memory.
    ///
    /// Non-2xx statuses are reported as [`HttpError::Transport`]; a partial
    /// file may be left behind and the caller owns cleanup of `dest`.
    ///
    /// Returns the number of bytes written.
    fn download(
        &self,
        url: &str,
        auth: Option<&Credentials>,
        dest: &Path,
    ) -> impl Future<Output = Result<u64, HttpError>> + Send;
}

impl<T: AsyncHttpClient> AsyncHttpClient for std::sync::Arc<T> {
    async fn get(
        &self,
        url: &str,
        auth: Option<&Credentials>,
    ) -> Result<HttpResponse, HttpError> {
        (**self).get(url, auth).await
    }

    async fn download(
        &self,
        url: &str,
        auth: Option<&Credentials>,
        dest: &Path,
    ) -> Result<u64, HttpError> {
        (**self).download(url, auth, dest).await
    }
}

/// Real HTTP client implementation using reqwest.
///
/// Every request carries a timeout; the upstream catalog has been observed
/// to hang connections indefinitely, and a timed-out request must surface as
/// a retryable condition rather than blocking the cycle forever. Buffered
/// requests ([`AsyncHttpClient::get`]: catalog queries, previews) and
/// streamed downloads ([`AsyncHttpClient::download`]: product archives) run
/// under separate deadlines, since an archive legitimately takes minutes.
#[derive(Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
    archive_client: reqwest::Client,
}

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

const DEFAULT_ARCHIVE_TIMEOUT_SECS: u64 = 600;

const USER_AGENT: &str = concat!("earthshot/", env!("CARGO_PKG_VERSION"));

impl ReqwestClient {
    /// Creates a client with the default timeouts (30 s requests, 600 s
    /// archive downloads).
    pub fn new() -> Result<Self, HttpError> {
        Self::with_timeouts(DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_ARCHIVE_TIMEOUT_SECS)
    }

    /// Creates a client with custom timeouts in seconds.
    ///
    /// `request_timeout_secs` bounds buffered requests; `archive_timeout_secs`
    /// bounds streamed downloads and must be generous, as product archives
    /// are hundreds of megabytes.
    pub fn with_timeouts(
        request_timeout_secs: u64,
        archive_timeout_secs: u64,
    ) -> Result<Self, HttpError> {
        Ok(Self {
            client: Self::build(request_timeout_secs)?,
            archive_client: Self::build(archive_timeout_secs)?,
        })
    }

    fn build(timeout_secs: u64) -> Result<reqwest::Client, HttpError> {
        reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .user_agent(USER_AGENT)
            .tcp_keepalive(std::time::Duration::from_secs(30))
            .tcp_nodelay(true)
            .build()
            .map_err(|e| HttpError::Transport(format!("failed to create HTTP client: {}", e)))
    }

    fn classify(e: reqwest::Error) -> HttpError {
        if e.is_timeout() {
            HttpError::Timeout(e.to_string())
        } else {
            HttpError::Transport(e.to_string())
        }
    }
}

impl AsyncHttpClient for ReqwestClient {
    async fn get(
        &self,
        url: &str,
        auth: Option<&Credentials>,
    ) -> Result<HttpResponse, HttpError> {
        trace!(url, "HTTP GET starting");

        let mut request = self.client.get(url);
        if let Some(creds) = auth {
            request = request.basic_auth(&creds.user, Some(&creds.password));
        }

        let response = request.send().await.map_err(|e| {
            warn!(url, error = %e, is_timeout = e.is_timeout(), "HTTP request failed");
            Self::classify(e)
        })?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| {
                warn!(url, error = %e, "failed to read response body");
                Self::classify(e)
            })?
            .to_vec();

        debug!(url, status, bytes = body.len(), "HTTP response received");
        Ok(HttpResponse { status, body })
    }

    async fn download(
        &self,
        url: &str,
        auth: Option<&Credentials>,
        dest: &Path,
    ) -> Result<u64, HttpError> {
        debug!(url, dest = %dest.display(), "streaming download starting");

        let mut request = self.archive_client.get(url);
        if let Some(creds) = auth {
            request = request.basic_auth(&creds.user, Some(&creds.password));
        }

        let mut response = request.send().await.map_err(Self::classify)?;
        if !response.status().is_success() {
            return Err(HttpError::Transport(format!(
                "HTTP {} from {}",
                response.status(),
                url
            )));
        }

        let mut file = tokio::fs::File::create(dest)
            .await
            .map_err(|e| HttpError::Io(format!("create {}: {}", dest.display(), e)))?;

        let mut written: u64 = 0;
        while let Some(chunk) = response.chunk().await.map_err(Self::classify)? {
            file.write_all(&chunk)
                .await
                .map_err(|e| HttpError::Io(format!("write {}: {}", dest.display(), e)))?;
            written += chunk.len() as u64;
        }

        file.flush()
            .await
            .map_err(|e| HttpError::Io(format!("flush {}: {}", dest.display(), e)))?;

        debug!(url, bytes = written, "streaming download complete");
        Ok(written)
    }
}
