//! Page-level fields shared by the content extractor and the analyzer
//!
//! Both read the untouched document: title, meta tags and headings are
//! never affected by main-content pruning.

use crate::document::{element_text, ParsedDocument};
use crate::extract::types::{Heading, MetaTags};
use scraper::ElementRef;

/// Text of the first `<title>`, trimmed; empty if there is none
pub fn extract_title(document: &ParsedDocument) -> String {
    document
        .find_first("title")
        .map(|title| element_text(&title))
        .unwrap_or_default()
}

/// Collects `<meta>` tags that have a name (or property) and a content
///
/// `name` takes precedence over `property` on the same tag. Tags with an
/// empty key or empty content are skipped. A key seen twice keeps the
/// value of the later tag.
pub fn extract_meta(document: &ParsedDocument) -> MetaTags {
    let mut meta = MetaTags::new();

    for element in document.find_all("meta") {
        let attrs = element.value();
        let key = attrs
            .attr("name")
            .filter(|name| !name.is_empty())
            .or_else(|| attrs.attr("property"))
            .filter(|key| !key.is_empty());

        let content = attrs.attr("content").filter(|c| !c.is_empty());

        if let (Some(key), Some(content)) = (key, content) {
            meta.insert(key.to_string(), content.to_string());
        }
    }

    meta
}

/// Every `h1`..`h6` element, in document order
pub fn extract_headings(document: &ParsedDocument) -> Vec<Heading> {
    document
        .html()
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter_map(|element| {
            let level = heading_level(element.value().name())?;
            Some(Heading {
                level,
                text: element_text(&element),
                id: element.value().attr("id").unwrap_or_default().to_string(),
            })
        })
        .collect()
}

/// Level of a heading tag name (`h1` → 1), `None` for anything else
pub fn heading_level(tag: &str) -> Option<u8> {
    match tag {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

/// Number of whitespace-delimited tokens in `text`
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
