//! Sumi-Scrape: single-page web content extraction
//!
//! This crate fetches one web page and derives structured content from its HTML:
//! title, main text, links, images, meta tags and headings, CSS-selector driven
//! field extraction, or a structural analysis of the whole document.

pub mod config;
pub mod crawler;
pub mod document;
pub mod extract;
pub mod transport;
pub mod url;

use thiserror::Error;

/// Main error type for Sumi-Scrape operations
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid crawl request: {0}")]
    InvalidRequest(#[from] RequestError),

    #[error("HTTP {status}: {reason}")]
    HttpStatus {
        url: String,
        status: u16,
        reason: String,
    },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },

    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    #[error("Invalid stage transition: {from} -> {to}")]
    InvalidTransition {
        from: crawler::CrawlStage,
        to: crawler::CrawlStage,
    },

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Client(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScrapeError {
    /// Returns true for failures raised by the transport layer
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::HttpStatus { .. } | Self::Timeout { .. } | Self::Network { .. }
        )
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Crawl request bound violations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("depth must be between 1 and 5, got {0}")]
    Depth(u32),

    #[error("delay must be between 500 and 10000 ms, got {0}")]
    Delay(u64),

    #[error("timeout must be between 5 and 120 s, got {0}")]
    Timeout(u64),

    #[error("url rejected: {0}")]
    Url(String),
}

/// Result type alias for Sumi-Scrape operations
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlRequest, CrawlResult, Crawler};
pub use document::ParsedDocument;
pub use extract::{AnalysisResult, FieldValue, Heading, Image, Link, SelectorExtractionResult};
pub use transport::{FetchOutcome, Transport, TransportKind};
