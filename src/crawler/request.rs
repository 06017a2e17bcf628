//! Crawl request parameters and their bounds

use crate::config::CrawlDefaults;
use crate::extract::ContentFlags;
use crate::url::parse_page_url;
use crate::RequestError;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::time::Duration;
use url::Url;

/// Accepted values for `depth`
pub const DEPTH_RANGE: RangeInclusive<u32> = 1..=5;

/// Accepted values for `delay_ms`
pub const DELAY_RANGE_MS: RangeInclusive<u64> = 500..=10_000;

/// Accepted values for `timeout_s`
pub const TIMEOUT_RANGE_SECS: RangeInclusive<u64> = 5..=120;

/// Parameters for crawling a single page
///
/// Out-of-range values are rejected by [`validate`](Self::validate), never
/// clamped. `depth` is validated but only one page is ever fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlRequest {
    /// Absolute http(s) URL of the page
    pub url: String,

    #[serde(default = "default_depth")]
    pub depth: u32,

    /// Pause after a successful crawl, in milliseconds
    #[serde(rename = "delay", default = "default_delay_ms")]
    pub delay_ms: u64,

    #[serde(default = "default_true")]
    pub extract_content: bool,

    #[serde(default = "default_true")]
    pub extract_links: bool,

    #[serde(default = "default_true")]
    pub extract_images: bool,

    #[serde(default = "default_true")]
    pub follow_redirects: bool,

    /// Fetch timeout, in seconds
    #[serde(rename = "timeout", default = "default_timeout_s")]
    pub timeout_s: u64,
}

fn default_depth() -> u32 {
    1
}

fn default_delay_ms() -> u64 {
    1000
}

fn default_timeout_s() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

impl CrawlRequest {
    /// Creates a request with the standard defaults
    ///
    /// Depth 1, 1000 ms delay, 30 s timeout, every extraction enabled and
    /// redirects followed.
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_defaults(url, &CrawlDefaults::default())
    }

    /// Creates a request using configured defaults
    pub fn with_defaults(url: impl Into<String>, defaults: &CrawlDefaults) -> Self {
        Self {
            url: url.into(),
            depth: defaults.depth,
            delay_ms: defaults.delay_ms,
            extract_content: defaults.extract_content,
            extract_links: defaults.extract_links,
            extract_images: defaults.extract_images,
            follow_redirects: defaults.follow_redirects,
            timeout_s: defaults.timeout_secs,
        }
    }

    /// Checks every bound and parses the URL
    ///
    /// # Returns
    ///
    /// * `Ok(Url)` - The request is valid; the parsed page URL
    /// * `Err(RequestError)` - The first violated bound
    pub fn validate(&self) -> Result<Url, RequestError> {
        let url = parse_page_url(&self.url).map_err(|e| RequestError::Url(e.to_string()))?;

        if !DEPTH_RANGE.contains(&self.depth) {
            return Err(RequestError::Depth(self.depth));
        }

        if !DELAY_RANGE_MS.contains(&self.delay_ms) {
            return Err(RequestError::Delay(self.delay_ms));
        }

        if !TIMEOUT_RANGE_SECS.contains(&self.timeout_s) {
            return Err(RequestError::Timeout(self.timeout_s));
        }

        Ok(url)
    }

    /// Extraction switches for the content extractor
    pub fn content_flags(&self) -> ContentFlags {
        ContentFlags {
            content: self.extract_content,
            links: self.extract_links,
            images: self.extract_images,
        }
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_s)
    }
}
