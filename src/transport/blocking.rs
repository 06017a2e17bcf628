//! Stateless synchronous fallback transport
//!
//! Each fetch builds a one-shot `reqwest::blocking::Client` and runs on
//! tokio's blocking thread pool, so async callers are never stalled. Nothing
//! is pooled or shared between calls.

use super::{classify_error, content_type, status_error, FetchOptions, FetchOutcome};
use super::{Transport, TransportKind};
use crate::config::TransportConfig;
use crate::ScrapeError;
use async_trait::async_trait;
use reqwest::blocking::Client;
use reqwest::redirect::Policy;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Notify;
use url::Url;

/// How long shutdown waits for in-flight fetches
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// One-shot synchronous transport
pub struct BlockingTransport {
    user_agent: String,
    max_redirects: usize,
    closed: AtomicBool,
    in_flight: Arc<InFlight>,
}

impl BlockingTransport {
    pub fn new(config: &TransportConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            max_redirects: config.max_redirects,
            closed: AtomicBool::new(false),
            in_flight: Arc::new(InFlight::default()),
        }
    }
}

/// Count of running fetches, with a signal for when it reaches zero
#[derive(Default)]
struct InFlight {
    count: AtomicUsize,
    idle: Notify,
}

impl InFlight {
    fn load(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    /// Waits until no fetch is running or `wait` elapses
    async fn wait_idle(&self, wait: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + wait;

        loop {
            // Register before checking so a finish in between is not missed
            let idle = self.idle.notified();
            tokio::pin!(idle);
            idle.as_mut().enable();

            if self.load() == 0 {
                return true;
            }

            if tokio::time::timeout_at(deadline, idle).await.is_err() {
                return self.load() == 0;
            }
        }
    }
}

/// Decrements the in-flight count when the blocking task finishes
struct InFlightGuard(Arc<InFlight>);

impl InFlightGuard {
    fn enter(in_flight: &Arc<InFlight>) -> Self {
        in_flight.count.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(in_flight))
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if self.0.count.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.0.idle.notify_waiters();
        }
    }
}

/// Performs the fetch synchronously on the calling thread
fn fetch_blocking(
    url: &Url,
    options: &FetchOptions,
    user_agent: &str,
    max_redirects: usize,
) -> Result<FetchOutcome, ScrapeError> {
    let policy = if options.follow_redirects {
        Policy::limited(max_redirects)
    } else {
        Policy::none()
    };

    let client = Client::builder()
        .user_agent(user_agent)
        .timeout(options.timeout)
        .redirect(policy)
        .gzip(true)
        .brotli(true)
        .build()
        .map_err(|e| ScrapeError::Client(e.to_string()))?;

    let started = Instant::now();
    let response = client
        .get(url.clone())
        .headers(options.headers.clone())
        .send()
        .map_err(|e| classify_error(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(status_error(url, status));
    }

    let final_url = response.url().to_string();
    let content_type = content_type(response.headers());
    let raw_html = response.text().map_err(|e| classify_error(url, e))?;

    Ok(FetchOutcome {
        final_url,
        status_code: status.as_u16(),
        content_type,
        raw_html,
        elapsed: started.elapsed(),
    })
}

#[async_trait]
impl Transport for BlockingTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::Blocking
    }

    async fn fetch(&self, url: &Url, options: &FetchOptions) -> Result<FetchOutcome, ScrapeError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(ScrapeError::Network {
                url: url.to_string(),
                message: "transport is shut down".to_string(),
            });
        }

        let guard = InFlightGuard::enter(&self.in_flight);
        let task_url = url.clone();
        let task_options = options.clone();
        let user_agent = self.user_agent.clone();
        let max_redirects = self.max_redirects;

        let outcome = tokio::task::spawn_blocking(move || {
            let _guard = guard;
            fetch_blocking(&task_url, &task_options, &user_agent, max_redirects)
        })
        .await
        .map_err(|e| ScrapeError::Network {
            url: url.to_string(),
            message: format!("blocking fetch task failed: {}", e),
        })??;

        tracing::debug!(
            "Fetched {} ({} bytes, status {}) in {:?} [blocking]",
            outcome.final_url,
            outcome.raw_html.len(),
            outcome.status_code,
            outcome.elapsed
        );

        Ok(outcome)
    }

    async fn shutdown(&self) {
        self.closed.store(true, Ordering::SeqCst);

        if self.in_flight.wait_idle(SHUTDOWN_GRACE).await {
            tracing::info!("Blocking transport shut down");
        } else {
            tracing::warn!(
                "Blocking transport shut down with {} fetch(es) still in flight",
                self.in_flight.load()
            );
        }
    }
}
