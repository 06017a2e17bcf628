//! Connection limiting for the pooled transport
//!
//! The pooled client is shared by every concurrent crawl. This module caps:
//! - the total number of simultaneous connections (global semaphore)
//! - the number of simultaneous connections to one endpoint (per-endpoint
//!   semaphores, keyed by scheme, host and port)
//!
//! Both caps are fixed at construction; they are never adjusted per request.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{Notify, OwnedSemaphorePermit, Semaphore};
use url::Url;

/// Holds one global slot and one per-endpoint slot until dropped
pub struct ConnectionPermit {
    endpoint: Option<OwnedSemaphorePermit>,
    global: Option<OwnedSemaphorePermit>,
    released: Arc<Notify>,
}

impl Drop for ConnectionPermit {
    fn drop(&mut self) {
        // Slots go back before waiters are woken
        self.endpoint.take();
        self.global.take();
        self.released.notify_waiters();
    }
}

/// Caps concurrent connections globally and per endpoint
pub struct ConnectionLimiter {
    /// Global semaphore for limiting concurrent fetches
    global: Arc<Semaphore>,

    /// Per-endpoint semaphores, created on first use
    endpoints: Mutex<HashMap<String, Arc<Semaphore>>>,

    /// Signalled each time a permit is released
    released: Arc<Notify>,

    max_connections: usize,
    max_per_endpoint: usize,
}

/// Key under which connections to `url` are counted
///
/// Two URLs share a key when they share scheme, host and effective port, so
/// `http://h:8080/` and `https://h/` are separate endpoints while
/// `https://H/` and `https://h:443/` are the same one.
pub fn endpoint_key(url: &Url) -> String {
    url.origin().ascii_serialization()
}

impl ConnectionLimiter {
    /// Creates a limiter with the given caps
    pub fn new(max_connections: usize, max_per_endpoint: usize) -> Self {
        Self {
            global: Arc::new(Semaphore::new(max_connections)),
            endpoints: Mutex::new(HashMap::new()),
            released: Arc::new(Notify::new()),
            max_connections,
            max_per_endpoint,
        }
    }

    /// Waits for a free slot for the endpoint serving `url`
    ///
    /// The per-endpoint slot is taken first so that requests queued behind a
    /// busy endpoint do not hold global slots other endpoints could use.
    ///
    /// # Returns
    ///
    /// * `Some(ConnectionPermit)` - A slot was acquired
    /// * `None` - The limiter has been closed
    pub async fn acquire(&self, url: &Url) -> Option<ConnectionPermit> {
        if self.global.is_closed() {
            return None;
        }

        let endpoint_semaphore = self.endpoint_semaphore(&endpoint_key(url))?;
        let endpoint_permit = endpoint_semaphore.acquire_owned().await.ok()?;
        let global_permit = self.global.clone().acquire_owned().await.ok()?;

        Some(ConnectionPermit {
            endpoint: Some(endpoint_permit),
            global: Some(global_permit),
            released: Arc::clone(&self.released),
        })
    }

    fn endpoint_semaphore(&self, key: &str) -> Option<Arc<Semaphore>> {
        let mut endpoints = self.endpoints.lock().ok()?;

        // Forget endpoints with no permit outstanding
        endpoints.retain(|_, semaphore| Arc::strong_count(semaphore) > 1);

        Some(
            endpoints
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(Semaphore::new(self.max_per_endpoint)))
                .clone(),
        )
    }

    /// Number of connections currently held
    pub fn in_flight(&self) -> usize {
        self.max_connections
            .saturating_sub(self.global.available_permits())
    }

    /// Returns true once [`close`](Self::close) has been called
    pub fn is_closed(&self) -> bool {
        self.global.is_closed()
    }

    /// Rejects all future acquisitions; held permits stay valid
    pub fn close(&self) {
        self.global.close();
    }

    /// Waits until every held permit is released or `wait` elapses
    ///
    /// # Returns
    ///
    /// `true` if the limiter drained completely
    pub async fn drain(&self, wait: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + wait;

        loop {
            // Register before checking so a release in between is not missed
            let released = self.released.notified();
            tokio::pin!(released);
            released.as_mut().enable();

            if self.in_flight() == 0 {
                return true;
            }

            if tokio::time::timeout_at(deadline, released).await.is_err() {
                return self.in_flight() == 0;
            }
        }
    }
}
