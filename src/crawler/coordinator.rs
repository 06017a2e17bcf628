//! Crawl orchestration
//!
//! The [`Crawler`] sequences one operation end to end:
//! - validating the request
//! - fetching the page through the process-wide transport
//! - parsing it into a document owned by this operation only
//! - running the content extractor, selector extractor or analyzer
//! - timing the work and applying the post-crawl delay
//!
//! `crawl` never returns an error: every failure becomes an error-shaped
//! [`CrawlResult`]. `extract` and `analyze` propagate their errors.
//!
//! Documents are parsed and consumed inside synchronous helpers, so no tree
//! is ever held across an await and every returned future is `Send`.

use crate::config::TransportConfig;
use crate::crawler::request::CrawlRequest;
use crate::crawler::result::{CrawlFailure, CrawlPage, CrawlResult};
use crate::crawler::stage::{CrawlStage, StageTracker};
use crate::document::ParsedDocument;
use crate::extract::{
    analyze, extract_by_selector, extract_content, AnalysisResult, ContentFlags,
    SelectorExtractionResult,
};
use crate::transport::{self, FetchOptions, FetchOutcome, Transport, TransportKind};
use crate::url::parse_page_url;
use crate::ScrapeError;
use reqwest::header::HeaderMap;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// Entry point for crawl, extract and analyze operations
///
/// Cheap to share: clone it or wrap it in an `Arc` and call it from as many
/// tasks as needed. All clones use the same transport.
#[derive(Clone)]
pub struct Crawler {
    transport: Arc<dyn Transport>,
    headers: HeaderMap,
    default_timeout: Duration,
}

impl Crawler {
    /// Selects the transport for this process and builds a crawler on it
    ///
    /// # Returns
    ///
    /// * `Ok(Crawler)` - Ready to serve requests
    /// * `Err(ScrapeError)` - No usable transport or invalid header values
    pub fn new(config: &TransportConfig) -> Result<Self, ScrapeError> {
        let transport = transport::initialize(config)?;
        Self::with_transport(transport, config)
    }

    /// Builds a crawler on an existing transport
    pub fn with_transport(
        transport: Arc<dyn Transport>,
        config: &TransportConfig,
    ) -> Result<Self, ScrapeError> {
        Ok(Self {
            transport,
            headers: transport::request_headers(config)?,
            default_timeout: Duration::from_secs(config.timeout_secs),
        })
    }

    /// The transport variant selected at start-up
    pub fn transport_kind(&self) -> TransportKind {
        self.transport.kind()
    }

    /// Crawls one page
    ///
    /// On success, sleeps for the request's delay before returning; the
    /// reported processing time excludes that delay. On failure, returns
    /// immediately with an error-shaped result and no content fields.
    pub async fn crawl(&self, request: &CrawlRequest) -> CrawlResult {
        let started = Instant::now();
        let mut stages = StageTracker::new(&request.url);

        match self.run_crawl(request, &mut stages).await {
            Ok(mut page) => {
                page.processing_time_s = started.elapsed().as_secs_f64();
                tracing::info!(
                    "Crawled {} ({} words, {} links, {} images) in {:.3}s",
                    page.url,
                    page.word_count,
                    page.links.len(),
                    page.images.len(),
                    page.processing_time_s
                );

                tokio::time::sleep(request.delay()).await;
                CrawlResult::Success(page)
            }
            Err(e) => {
                let failed_in = stages.fail();
                tracing::error!("Crawl of {} failed during {}: {}", request.url, failed_in, e);

                CrawlResult::Failure(CrawlFailure {
                    url: request.url.clone(),
                    error: e.to_string(),
                    processing_time_s: started.elapsed().as_secs_f64(),
                })
            }
        }
    }

    async fn run_crawl(
        &self,
        request: &CrawlRequest,
        stages: &mut StageTracker,
    ) -> Result<CrawlPage, ScrapeError> {
        let url = request.validate()?;

        stages.advance(CrawlStage::Fetch)?;
        let options = FetchOptions::new(
            self.headers.clone(),
            request.timeout(),
            request.follow_redirects,
        );
        let outcome = self.transport.fetch(&url, &options).await?;

        let page = build_page(&request.url, &url, outcome, request.content_flags(), stages)?;
        stages.advance(CrawlStage::Done)?;
        Ok(page)
    }

    /// Fetches a page and evaluates `selectors` against it
    ///
    /// # Returns
    ///
    /// * `Ok(SelectorExtractionResult)` - One value per requested field
    /// * `Err(ScrapeError)` - Invalid URL, fetch failure or invalid selector
    pub async fn extract(
        &self,
        url: &str,
        selectors: &HashMap<String, String>,
    ) -> Result<SelectorExtractionResult, ScrapeError> {
        let result = match self.fetch_default(url).await {
            Ok(outcome) => select_fields(&outcome.raw_html, selectors),
            Err(e) => Err(e),
        };

        if let Err(e) = &result {
            tracing::error!("Selector extraction from {} failed: {}", url, e);
        }
        result
    }

    /// Fetches a page and analyzes its structure
    ///
    /// # Returns
    ///
    /// * `Ok(AnalysisResult)` - Tallies over the whole document
    /// * `Err(ScrapeError)` - Invalid URL or fetch failure
    pub async fn analyze(&self, url: &str) -> Result<AnalysisResult, ScrapeError> {
        let result = self
            .fetch_default(url)
            .await
            .map(|outcome| analyze(&ParsedDocument::parse(&outcome.raw_html), url));

        if let Err(e) = &result {
            tracing::error!("Analysis of {} failed: {}", url, e);
        }
        result
    }

    /// Fetches with the configured timeout, following redirects
    async fn fetch_default(&self, url: &str) -> Result<FetchOutcome, ScrapeError> {
        let url = parse_page_url(url)?;
        let options = FetchOptions::new(self.headers.clone(), self.default_timeout, true);
        self.transport.fetch(&url, &options).await
    }

    /// Releases the transport; later fetches fail
    pub async fn shutdown(&self) {
        self.transport.shutdown().await;
    }
}

/// Parses a fetched page and runs the content extractor
///
/// Kept synchronous so the document never lives across an await.
fn build_page(
    requested_url: &str,
    page_url: &Url,
    outcome: FetchOutcome,
    flags: ContentFlags,
    stages: &mut StageTracker,
) -> Result<CrawlPage, ScrapeError> {
    stages.advance(CrawlStage::Parse)?;
    let document = ParsedDocument::parse(&outcome.raw_html);

    // Relative references resolve against where the page actually lives
    let base_url = Url::parse(&outcome.final_url).unwrap_or_else(|_| page_url.clone());

    stages.advance(CrawlStage::Extract)?;
    let content = extract_content(&document, &base_url, flags);

    Ok(CrawlPage {
        url: requested_url.to_string(),
        status_code: outcome.status_code,
        content_type: outcome.content_type,
        title: content.title,
        text: content.text,
        raw_html: outcome.raw_html,
        links: content.links,
        images: content.images,
        meta: content.meta,
        headings: content.headings,
        word_count: content.word_count,
        processing_time_s: 0.0,
    })
}

fn select_fields(
    raw_html: &str,
    selectors: &HashMap<String, String>,
) -> Result<SelectorExtractionResult, ScrapeError> {
    let document = ParsedDocument::parse(raw_html);
    extract_by_selector(&document, selectors)
}
