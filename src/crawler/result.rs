//! Crawl result: success xor error

use crate::extract::{Heading, Image, Link, MetaTags};
use serde::Serialize;

/// Everything derived from a successfully crawled page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrawlPage {
    /// URL as requested
    pub url: String,
    pub status_code: u16,
    pub content_type: String,
    pub title: String,
    /// Main content text
    pub text: String,
    #[serde(rename = "html")]
    pub raw_html: String,
    pub links: Vec<Link>,
    pub images: Vec<Image>,
    pub meta: MetaTags,
    pub headings: Vec<Heading>,
    pub word_count: usize,
    #[serde(rename = "processing_time")]
    pub processing_time_s: f64,
}

/// A crawl that stopped at its first failure
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrawlFailure {
    pub url: String,
    pub error: String,
    #[serde(rename = "processing_time")]
    pub processing_time_s: f64,
}

/// Outcome of one crawl
///
/// Serializes as either the page shape or `{url, error, processing_time}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CrawlResult {
    Success(CrawlPage),
    Failure(CrawlFailure),
}

impl CrawlResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn url(&self) -> &str {
        match self {
            Self::Success(page) => &page.url,
            Self::Failure(failure) => &failure.url,
        }
    }

    /// Error message, `None` on success
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Success(_) => None,
            Self::Failure(failure) => Some(&failure.error),
        }
    }

    pub fn page(&self) -> Option<&CrawlPage> {
        match self {
            Self::Success(page) => Some(page),
            Self::Failure(_) => None,
        }
    }

    pub fn processing_time_s(&self) -> f64 {
        match self {
            Self::Success(page) => page.processing_time_s,
            Self::Failure(failure) => failure.processing_time_s,
        }
    }
}
