//! Pooled persistent HTTP transport
//!
//! One `reqwest::Client` per redirect policy is built at start-up and shared by
//! every fetch, so connections are reused across concurrent crawls. Connection
//! caps are enforced by a [`ConnectionLimiter`].

use super::{classify_error, content_type, status_error, FetchOptions, FetchOutcome};
use super::{ConnectionLimiter, Transport, TransportKind};
use crate::config::TransportConfig;
use crate::ScrapeError;
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use std::time::{Duration, Instant};
use url::Url;

/// How long shutdown waits for in-flight fetches
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Persistent client transport with connection caps
pub struct PooledTransport {
    /// Client that follows up to `max-redirects` hops
    following: Client,

    /// Client that returns 3xx responses as-is
    non_following: Client,

    limiter: ConnectionLimiter,
}

impl PooledTransport {
    /// Builds both clients and the connection limiter
    ///
    /// # Returns
    ///
    /// * `Ok(PooledTransport)` - Clients built successfully
    /// * `Err(ScrapeError)` - The HTTP client could not be constructed
    pub fn new(config: &TransportConfig) -> Result<Self, ScrapeError> {
        let following = build_http_client(config, Policy::limited(config.max_redirects))?;
        let non_following = build_http_client(config, Policy::none())?;

        Ok(Self {
            following,
            non_following,
            limiter: ConnectionLimiter::new(
                config.max_connections,
                config.max_connections_per_host,
            ),
        })
    }

    /// Number of fetches currently holding a connection slot
    pub fn in_flight(&self) -> usize {
        self.limiter.in_flight()
    }
}

/// Builds an HTTP client with the configured identity and limits
fn build_http_client(config: &TransportConfig, policy: Policy) -> Result<Client, ScrapeError> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .pool_max_idle_per_host(config.max_connections_per_host)
        .redirect(policy)
        .gzip(true)
        .brotli(true)
        .build()
        .map_err(|e| ScrapeError::Client(e.to_string()))
}

#[async_trait]
impl Transport for PooledTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::Pooled
    }

    async fn fetch(&self, url: &Url, options: &FetchOptions) -> Result<FetchOutcome, ScrapeError> {
        let _permit = self
            .limiter
            .acquire(url)
            .await
            .ok_or_else(|| ScrapeError::Network {
                url: url.to_string(),
                message: "transport is shut down".to_string(),
            })?;

        let client = if options.follow_redirects {
            &self.following
        } else {
            &self.non_following
        };

        let started = Instant::now();
        let response = client
            .get(url.clone())
            .headers(options.headers.clone())
            .timeout(options.timeout)
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(url, status));
        }

        let final_url = response.url().to_string();
        let content_type = content_type(response.headers());
        let raw_html = response.text().await.map_err(|e| classify_error(url, e))?;

        tracing::debug!(
            "Fetched {} ({} bytes, status {}) in {:?}",
            final_url,
            raw_html.len(),
            status.as_u16(),
            started.elapsed()
        );

        Ok(FetchOutcome {
            final_url,
            status_code: status.as_u16(),
            content_type,
            raw_html,
            elapsed: started.elapsed(),
        })
    }

    async fn shutdown(&self) {
        self.limiter.close();
        if self.limiter.drain(SHUTDOWN_GRACE).await {
            tracing::info!("Pooled transport shut down");
        } else {
            tracing::warn!(
                "Pooled transport shut down with {} fetch(es) still in flight",
                self.limiter.in_flight()
            );
        }
    }
}
