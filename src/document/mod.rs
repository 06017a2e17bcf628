//! HTML document wrapper
//!
//! [`ParsedDocument`] turns a raw HTML string into a read-only tree and
//! exposes the lookups the extractors need:
//! - tag lookup by name
//! - attribute-presence lookup
//! - CSS selector evaluation
//! - text extraction with tags removed
//!
//! Parsing never fails. Malformed markup is recovered the way browsers
//! recover it; the parser's recovery notes are only logged.

use crate::ScrapeError;
use scraper::{ElementRef, Html, Selector};

/// Parsed, immutable HTML document owned by a single operation
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    html: Html,
}

impl ParsedDocument {
    /// Parses a full HTML document
    ///
    /// # Example
    ///
    /// ```
    /// use sumi_scrape::ParsedDocument;
    ///
    /// let doc = ParsedDocument::parse("<title>Hi</title><p>unclosed <b>tags");
    /// assert_eq!(doc.find_first("title").map(|t| t.text().collect::<String>()), Some("Hi".to_string()));
    /// ```
    pub fn parse(raw_html: &str) -> Self {
        let html = Html::parse_document(raw_html);

        if !html.errors.is_empty() {
            tracing::debug!(
                "HTML parser recovered from {} issue(s); first: {}",
                html.errors.len(),
                html.errors[0]
            );
        }

        Self { html }
    }

    /// The underlying scraper tree
    pub fn html(&self) -> &Html {
        &self.html
    }

    /// Evaluates a CSS selector against the whole document, in document order
    pub fn select(&self, css: &str) -> Result<Vec<ElementRef<'_>>, ScrapeError> {
        let selector = compile_selector(css)?;
        Ok(self.select_compiled(&selector))
    }

    /// Evaluates an already compiled selector, in document order
    ///
    /// Walks the tree from the root element rather than the node arena so
    /// results follow document order even after parser recovery moved nodes.
    pub fn select_compiled(&self, selector: &Selector) -> Vec<ElementRef<'_>> {
        let root = self.html.root_element();
        std::iter::once(root)
            .filter(|element| selector.matches(element))
            .chain(root.select(selector))
            .collect()
    }

    /// Counts elements matching a CSS selector
    pub fn count(&self, css: &str) -> Result<usize, ScrapeError> {
        Ok(self.select(css)?.len())
    }

    /// All elements with the given tag name, in document order
    pub fn find_all(&self, tag: &str) -> Vec<ElementRef<'_>> {
        self.html
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
            .filter(|element| element.value().name().eq_ignore_ascii_case(tag))
            .collect()
    }

    /// First element with the given tag name
    pub fn find_first(&self, tag: &str) -> Option<ElementRef<'_>> {
        self.html
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
            .find(|element| element.value().name().eq_ignore_ascii_case(tag))
    }

    /// Elements with the given tag name that carry `attr` (even if empty)
    pub fn find_with_attr(&self, tag: &str, attr: &str) -> Vec<ElementRef<'_>> {
        self.find_all(tag)
            .into_iter()
            .filter(|element| element.value().attr(attr).is_some())
            .collect()
    }

    /// Text of the whole document with tags removed
    ///
    /// Includes the text of every node: head, scripts, navigation and all.
    pub fn text(&self) -> String {
        self.html.root_element().text().collect()
    }
}

/// Compiles a CSS selector, mapping syntax errors to [`ScrapeError::Selector`]
pub fn compile_selector(css: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(css).map_err(|e| ScrapeError::Selector {
        selector: css.to_string(),
        message: e.to_string(),
    })
}

/// Text of an element with tags removed, trimmed
pub fn element_text(element: &ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
