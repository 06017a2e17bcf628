//! Sumi-Scrape main entry point
//!
//! This is the command-line interface for the Sumi-Scrape page extractor.
//! Every command prints a JSON document on stdout; logs go to stderr.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use std::collections::HashMap;
use std::path::PathBuf;
use sumi_scrape::config::{load_config_with_hash, Config};
use sumi_scrape::crawler::{CrawlRequest, CrawlResult, Crawler};
use tracing_subscriber::EnvFilter;

/// Sumi-Scrape: single-page web content extraction
///
/// Fetches a page and derives its title, main text, links, images, meta
/// tags and headings, extracts fields by CSS selector, or analyzes the
/// page structure.
#[derive(Parser, Debug)]
#[command(name = "sumi-scrape")]
#[command(version)]
#[command(about = "Single-page web content extraction", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl one or more pages, one after another
    Crawl(CrawlArgs),

    /// Extract fields from a page with CSS selectors
    Extract {
        /// Page URL
        url: String,

        /// Field to extract, as NAME=SELECTOR (repeatable)
        #[arg(short = 's', long = "select", value_name = "NAME=SELECTOR", value_parser = parse_selector_arg, required = true)]
        selectors: Vec<(String, String)>,
    },

    /// Analyze the structure of a page
    Analyze {
        /// Page URL
        url: String,
    },

    /// Report service status and the selected transport
    Health,
}

#[derive(Args, Debug)]
struct CrawlArgs {
    /// Page URLs
    #[arg(required = true)]
    urls: Vec<String>,

    /// Crawl depth (1-5, validated only)
    #[arg(long)]
    depth: Option<u32>,

    /// Delay after each successful crawl in milliseconds (500-10000)
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Fetch timeout in seconds (5-120)
    #[arg(long)]
    timeout: Option<u64>,

    /// Skip main content extraction
    #[arg(long)]
    no_content: bool,

    /// Skip link extraction
    #[arg(long)]
    no_links: bool,

    /// Skip image extraction
    #[arg(long)]
    no_images: bool,

    /// Do not follow redirects
    #[arg(long)]
    no_redirects: bool,
}

impl CrawlArgs {
    fn request_for(&self, url: &str, config: &Config) -> CrawlRequest {
        let mut request = CrawlRequest::with_defaults(url, &config.crawl);
        if let Some(depth) = self.depth {
            request.depth = depth;
        }
        if let Some(delay_ms) = self.delay_ms {
            request.delay_ms = delay_ms;
        }
        if let Some(timeout) = self.timeout {
            request.timeout_s = timeout;
        }
        request.extract_content &= !self.no_content;
        request.extract_links &= !self.no_links;
        request.extract_images &= !self.no_images;
        request.follow_redirects &= !self.no_redirects;
        request
    }
}

/// Parses a NAME=SELECTOR argument
fn parse_selector_arg(arg: &str) -> Result<(String, String), String> {
    match arg.split_once('=') {
        Some((name, selector)) if !name.trim().is_empty() && !selector.trim().is_empty() => {
            Ok((name.trim().to_string(), selector.trim().to_string()))
        }
        _ => Err(format!("expected NAME=SELECTOR, got '{}'", arg)),
    }
}

/// One entry of the crawl command output
#[derive(Serialize)]
struct CrawlResponse<'a> {
    url: &'a str,
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a CrawlResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
    timestamp: String,
    processing_time: f64,
}

#[derive(Serialize)]
struct CrawlSummary {
    total: usize,
    successful: usize,
    failed: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    let crawler = Crawler::new(&config.transport).context("failed to initialize transport")?;

    let succeeded = match cli.command {
        Command::Crawl(args) => handle_crawl(&crawler, &config, &args).await?,
        Command::Extract { url, selectors } => handle_extract(&crawler, &url, selectors).await?,
        Command::Analyze { url } => handle_analyze(&crawler, &url).await?,
        Command::Health => handle_health(&crawler)?,
    };

    crawler.shutdown().await;

    if !succeeded {
        std::process::exit(1);
    }
    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_scrape=info,warn"),
            1 => EnvFilter::new("sumi_scrape=debug,info"),
            2 => EnvFilter::new("sumi_scrape=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Crawls each URL in turn and prints the results with a summary
///
/// Returns true when at least one crawl succeeded.
async fn handle_crawl(
    crawler: &Crawler,
    config: &Config,
    args: &CrawlArgs,
) -> anyhow::Result<bool> {
    let mut results = Vec::with_capacity(args.urls.len());
    for url in &args.urls {
        let request = args.request_for(url, config);
        let result = crawler.crawl(&request).await;
        results.push((result, chrono::Utc::now().to_rfc3339()));
    }

    let successful = results.iter().filter(|(r, _)| r.is_success()).count();
    print_json(&crawl_envelope(&results))?;
    Ok(successful > 0)
}

/// Batch output: one entry per crawl plus totals
fn crawl_envelope(results: &[(CrawlResult, String)]) -> serde_json::Value {
    let responses: Vec<CrawlResponse<'_>> = results
        .iter()
        .map(|(result, timestamp)| CrawlResponse {
            url: result.url(),
            success: result.is_success(),
            data: result.is_success().then_some(result),
            error: result.error(),
            timestamp: timestamp.clone(),
            processing_time: result.processing_time_s(),
        })
        .collect();

    let successful = responses.iter().filter(|r| r.success).count();
    let summary = CrawlSummary {
        total: responses.len(),
        successful,
        failed: responses.len() - successful,
    };

    json!({ "success": true, "results": responses, "summary": summary })
}

async fn handle_extract(
    crawler: &Crawler,
    url: &str,
    selectors: Vec<(String, String)>,
) -> anyhow::Result<bool> {
    let selectors: HashMap<String, String> = selectors.into_iter().collect();

    match crawler.extract(url, &selectors).await {
        Ok(data) => {
            print_json(&json!({ "success": true, "data": data }))?;
            Ok(true)
        }
        Err(e) => {
            print_json(&json!({ "success": false, "error": e.to_string() }))?;
            Ok(false)
        }
    }
}

async fn handle_analyze(crawler: &Crawler, url: &str) -> anyhow::Result<bool> {
    match crawler.analyze(url).await {
        Ok(analysis) => {
            print_json(&json!({ "success": true, "analysis": analysis }))?;
            Ok(true)
        }
        Err(e) => {
            print_json(&json!({ "success": false, "error": e.to_string() }))?;
            Ok(false)
        }
    }
}

fn handle_health(crawler: &Crawler) -> anyhow::Result<bool> {
    print_json(&json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "services": {
            "crawler": "running",
            "transport": crawler.transport_kind(),
        },
    }))?;
    Ok(true)
}

fn print_json(value: &serde_json::Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
