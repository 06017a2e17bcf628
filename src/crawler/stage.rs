//! Crawl stage tracking
//!
//! One crawl moves through a fixed sequence and stops at its first failure:
//!
//! ```text
//! Start → Fetch → Parse → Extract → Done
//!   ↓       ↓                ↓
//!   └───────┴──── Error ─────┘ → Done
//! ```
//!
//! There are no retries, so no stage is ever re-entered.

use crate::ScrapeError;
use std::fmt;

/// Stage of a single crawl invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlStage {
    /// Request accepted, nothing done yet
    Start,

    /// Waiting on the transport
    Fetch,

    /// Building the document tree
    Parse,

    /// Deriving result fields
    Extract,

    /// A stage failed; the result will be error-shaped
    Error,

    /// Result produced
    Done,
}

impl CrawlStage {
    /// Returns true if `next` may directly follow this stage
    pub fn can_transition_to(&self, next: CrawlStage) -> bool {
        matches!(
            (self, next),
            (Self::Start, Self::Fetch)
                | (Self::Fetch, Self::Parse)
                | (Self::Parse, Self::Extract)
                | (Self::Extract, Self::Done)
                | (Self::Start, Self::Error)
                | (Self::Fetch, Self::Error)
                | (Self::Extract, Self::Error)
                | (Self::Error, Self::Done)
        )
    }

    /// Returns true once no further transition is possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Fetch => "fetch",
            Self::Parse => "parse",
            Self::Extract => "extract",
            Self::Error => "error",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for CrawlStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Tracks the stage of one crawl and logs each transition
#[derive(Debug)]
pub struct StageTracker {
    url: String,
    stage: CrawlStage,
}

impl StageTracker {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            stage: CrawlStage::Start,
        }
    }

    pub fn stage(&self) -> CrawlStage {
        self.stage
    }

    /// Moves to `next`, rejecting transitions the sequence does not allow
    pub fn advance(&mut self, next: CrawlStage) -> Result<(), ScrapeError> {
        if !self.stage.can_transition_to(next) {
            return Err(ScrapeError::InvalidTransition {
                from: self.stage,
                to: next,
            });
        }

        tracing::debug!("{}: {} -> {}", self.url, self.stage, next);
        self.stage = next;
        Ok(())
    }

    /// Records a failure in the current stage and finishes the crawl
    ///
    /// Returns the stage in which the failure happened.
    pub fn fail(&mut self) -> CrawlStage {
        let failed_in = self.stage;
        if self.stage.can_transition_to(CrawlStage::Error) {
            tracing::debug!("{}: {} -> {}", self.url, self.stage, CrawlStage::Error);
            self.stage = CrawlStage::Error;
        }
        if self.stage == CrawlStage::Error {
            self.stage = CrawlStage::Done;
        }
        failed_in
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        let mut tracker = StageTracker::new("https://example.com/");
        for next in [
            CrawlStage::Fetch,
            CrawlStage::Parse,
            CrawlStage::Extract,
            CrawlStage::Done,
        ] {
            tracker.advance(next).unwrap();
        }
        assert!(tracker.stage().is_terminal());
    }

    #[test]
    fn test_no_skipping_or_reentry() {
        assert!(!CrawlStage::Start.can_transition_to(CrawlStage::Parse));
        assert!(!CrawlStage::Fetch.can_transition_to(CrawlStage::Extract));
        assert!(!CrawlStage::Fetch.can_transition_to(CrawlStage::Fetch));
        assert!(!CrawlStage::Done.can_transition_to(CrawlStage::Start));
        assert!(!CrawlStage::Error.can_transition_to(CrawlStage::Fetch));
    }

    #[test]
    fn test_parse_cannot_fail() {
        assert!(!CrawlStage::Parse.can_transition_to(CrawlStage::Error));
    }

    #[test]
    fn test_invalid_transition_error() {
        let mut tracker = StageTracker::new("https://example.com/");
        let err = tracker.advance(CrawlStage::Extract).unwrap_err();
        assert!(matches!(
            err,
            ScrapeError::InvalidTransition {
                from: CrawlStage::Start,
                to: CrawlStage::Extract
            }
        ));
        assert_eq!(tracker.stage(), CrawlStage::Start);
    }

    #[test]
    fn test_fail_from_fetch() {
        let mut tracker = StageTracker::new("https://example.com/");
        tracker.advance(CrawlStage::Fetch).unwrap();
        assert_eq!(tracker.fail(), CrawlStage::Fetch);
        assert_eq!(tracker.stage(), CrawlStage::Done);
    }

    #[test]
    fn test_fail_before_fetch() {
        let mut tracker = StageTracker::new("not a url");
        assert_eq!(tracker.fail(), CrawlStage::Start);
        assert_eq!(tracker.stage(), CrawlStage::Done);
    }

    #[test]
    fn test_display() {
        assert_eq!(CrawlStage::Extract.to_string(), "extract");
        assert_eq!(CrawlStage::Done.to_string(), "done");
    }
}
