//! Structural analysis
//!
//! Tallies headings and common elements over the full, unpruned document.
//! Its word count covers every text node in the page, including navigation,
//! footers and scripts, and is deliberately independent of the main-content
//! word count produced by the content extractor.

use crate::document::ParsedDocument;
use crate::extract::metadata::{extract_headings, extract_meta, extract_title, word_count};
use crate::extract::types::{AnalysisResult, ElementCounts, HeadingCounts};
use scraper::ElementRef;

/// Analyzes the structure of a page
///
/// # Example
///
/// ```
/// use sumi_scrape::extract::analyze;
/// use sumi_scrape::ParsedDocument;
///
/// let doc = ParsedDocument::parse("<h1>A</h1><h2>B</h2><h2>C</h2><p>x</p><ul></ul><ol></ol>");
/// let analysis = analyze(&doc, "https://example.com/");
/// assert_eq!(analysis.headings.h2, 2);
/// assert_eq!(analysis.elements.lists, 2);
/// assert_eq!(analysis.structure.len(), 3);
/// ```
pub fn analyze(document: &ParsedDocument, url: &str) -> AnalysisResult {
    let structure = extract_headings(document);

    let mut headings = HeadingCounts::default();
    for heading in &structure {
        headings.record(heading.level);
    }

    AnalysisResult {
        url: url.to_string(),
        title: extract_title(document),
        headings,
        elements: count_elements(document),
        word_count: word_count(&document.text()),
        meta: extract_meta(document),
        structure,
    }
}

/// Counts paragraphs, links, images, lists, tables and forms in one pass
fn count_elements(document: &ParsedDocument) -> ElementCounts {
    let mut counts = ElementCounts::default();

    for element in document
        .html()
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
    {
        match element.value().name() {
            "p" => counts.paragraphs += 1,
            "a" => counts.links += 1,
            "img" => counts.images += 1,
            "ul" | "ol" => counts.lists += 1,
            "table" => counts.tables += 1,
            "form" => counts.forms += 1,
            _ => {}
        }
    }

    counts
}
