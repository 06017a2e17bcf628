//! Extraction over a parsed document
//!
//! Three independent read paths share one immutable [`ParsedDocument`]:
//! - [`extract_content`]: title, main text, links, images, meta, headings
//! - [`extract_by_selector`]: caller-supplied CSS selectors
//! - [`analyze`]: whole-document element and heading tallies
//!
//! None of them mutates the document; the content extractor prunes a
//! private copy.
//!
//! [`ParsedDocument`]: crate::document::ParsedDocument

mod analysis;
mod content;
mod metadata;
mod selector;
mod types;

pub use analysis::analyze;
pub use content::{extract_content, extract_images, extract_links, extract_main_text, MAX_IMAGES, MAX_LINKS};
pub use metadata::{extract_headings, extract_meta, extract_title, word_count};
pub use selector::extract_by_selector;
pub use types::{
    AnalysisResult, ContentFlags, ElementCounts, FieldValue, Heading, HeadingCounts, Image, Link,
    MetaTags, PageContent, SelectorExtractionResult,
};
