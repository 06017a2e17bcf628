//! URL handling module for Sumi-Scrape
//!
//! This module validates the page URLs handed to the crawler and resolves
//! references found inside a page (link hrefs, image srcs) against the URL
//! of the page they came from.

mod resolve;
mod validate;

// Re-export main functions
pub use resolve::resolve_reference;
pub use validate::parse_page_url;
