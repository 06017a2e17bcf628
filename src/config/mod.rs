//! Configuration module for Sumi-Scrape
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key is optional; a missing file section falls back to its defaults.
//!
//! # Example
//!
//! ```no_run
//! use sumi_scrape::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("scrape.toml")).unwrap();
//! println!("Per-host connection cap: {}", config.transport.max_connections_per_host);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlDefaults, TransportConfig, TransportStrategy, DEFAULT_ACCEPT,
    DEFAULT_ACCEPT_LANGUAGE, DEFAULT_USER_AGENT,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
