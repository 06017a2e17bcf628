//! Crawler module for single-page crawl operations
//!
//! This module contains the orchestration logic, including:
//! - Crawl request parameters and bound validation
//! - Stage tracking for a single crawl
//! - The success-xor-error crawl result
//! - The [`Crawler`] that sequences fetch, parse and extraction

mod coordinator;
mod request;
mod result;
mod stage;

pub use coordinator::Crawler;
pub use request::{CrawlRequest, DELAY_RANGE_MS, DEPTH_RANGE, TIMEOUT_RANGE_SECS};
pub use result::{CrawlFailure, CrawlPage, CrawlResult};
pub use stage::{CrawlStage, StageTracker};
