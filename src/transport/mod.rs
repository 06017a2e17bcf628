//! Transport layer: acquires raw HTML for a URL
//!
//! Two interchangeable strategies implement [`Transport`]:
//! - [`PooledTransport`]: a persistent async client shared by every request,
//!   with a global connection cap and a per-endpoint cap
//! - [`BlockingTransport`]: a stateless synchronous fetch run on the blocking
//!   thread pool, used when the pooled client cannot be built at start-up
//!
//! The strategy is chosen once by [`initialize`] and reused for the lifetime
//! of the process. Callers only ever see `Arc<dyn Transport>`.

mod blocking;
mod limiter;
mod pooled;

pub use blocking::BlockingTransport;
pub use limiter::{endpoint_key, ConnectionLimiter, ConnectionPermit};
pub use pooled::PooledTransport;

use crate::config::{TransportConfig, TransportStrategy};
use crate::ScrapeError;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::StatusCode;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Raw result of a successful (2xx) fetch
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    /// Final URL after any redirects
    pub final_url: String,

    /// HTTP status code (always 2xx)
    pub status_code: u16,

    /// Content-Type header value, empty if absent
    pub content_type: String,

    /// Decoded response body
    pub raw_html: String,

    /// Time spent on the network for this fetch
    pub elapsed: Duration,
}

/// Per-request transport options
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Headers sent with the request
    pub headers: HeaderMap,

    /// Total time allowed for connect, send and body download
    pub timeout: Duration,

    /// Whether 3xx responses are followed
    pub follow_redirects: bool,
}

impl FetchOptions {
    pub fn new(headers: HeaderMap, timeout: Duration, follow_redirects: bool) -> Self {
        Self {
            headers,
            timeout,
            follow_redirects,
        }
    }
}

/// Identifies the transport variant in use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    Pooled,
    Blocking,
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pooled => write!(f, "pooled"),
            Self::Blocking => write!(f, "blocking"),
        }
    }
}

/// A strategy for fetching a page over HTTP
///
/// Implementations must treat any non-2xx status as a failure
/// ([`ScrapeError::HttpStatus`]) and map connection problems to
/// [`ScrapeError::Timeout`] or [`ScrapeError::Network`].
#[async_trait]
pub trait Transport: Send + Sync {
    /// Which variant this is
    fn kind(&self) -> TransportKind;

    /// Fetches `url` and returns its body
    async fn fetch(&self, url: &Url, options: &FetchOptions) -> Result<FetchOutcome, ScrapeError>;

    /// Stops accepting new fetches and waits (bounded) for in-flight ones
    async fn shutdown(&self);
}

/// Selects and builds the transport for this process
///
/// With [`TransportStrategy::Auto`] the pooled client is preferred and the
/// blocking fetch is used only if the pooled client cannot be constructed.
pub fn initialize(config: &TransportConfig) -> Result<Arc<dyn Transport>, ScrapeError> {
    let transport: Arc<dyn Transport> = match config.strategy {
        TransportStrategy::Pooled => Arc::new(PooledTransport::new(config)?),
        TransportStrategy::Blocking => Arc::new(BlockingTransport::new(config)),
        TransportStrategy::Auto => match PooledTransport::new(config) {
            Ok(pooled) => Arc::new(pooled),
            Err(e) => {
                tracing::warn!("Pooled HTTP client unavailable ({}), using blocking fallback", e);
                Arc::new(BlockingTransport::new(config))
            }
        },
    };

    tracing::info!("Transport initialized: {}", transport.kind());
    Ok(transport)
}

/// Builds the headers applied uniformly to every outgoing request
pub fn request_headers(config: &TransportConfig) -> Result<HeaderMap, ScrapeError> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, header_value(&config.user_agent)?);
    headers.insert(ACCEPT, header_value(&config.accept)?);
    headers.insert(ACCEPT_LANGUAGE, header_value(&config.accept_language)?);
    Ok(headers)
}

fn header_value(value: &str) -> Result<HeaderValue, ScrapeError> {
    HeaderValue::from_str(value)
        .map_err(|e| ScrapeError::Client(format!("invalid header value '{}': {}", value, e)))
}

/// Maps a non-2xx status to the transport error
pub(crate) fn status_error(url: &Url, status: StatusCode) -> ScrapeError {
    ScrapeError::HttpStatus {
        url: url.to_string(),
        status: status.as_u16(),
        reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
    }
}

/// Classifies a client error as timeout or generic network failure
pub(crate) fn classify_error(url: &Url, error: reqwest::Error) -> ScrapeError {
    if error.is_timeout() {
        ScrapeError::Timeout {
            url: url.to_string(),
        }
    } else if error.is_connect() {
        ScrapeError::Network {
            url: url.to_string(),
            message: format!("Connection failed: {}", error),
        }
    } else {
        ScrapeError::Network {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}

/// Reads the Content-Type header, empty if absent or not valid text
pub(crate) fn content_type(headers: &HeaderMap) -> String {
    headers
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string()
}
