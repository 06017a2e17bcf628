//! Content extraction
//!
//! Derives the readable parts of a page:
//! - title, meta tags and headings (always)
//! - main content text and its word count (when requested)
//! - links and images, resolved to absolute URLs (when requested)
//!
//! # Main Content Heuristic
//!
//! On a private copy of the tree, every `script`, `style`, `nav`, `footer`
//! and `aside` subtree is removed. The first of these is then used:
//! 1. a `main` element
//! 2. an `article` element
//! 3. the first element whose class list contains `content`
//! 4. the document `body`
//!
//! Links, images, meta tags and headings are read from the unpruned
//! document, so navigation links are still reported.

use crate::document::{element_text, ParsedDocument};
use crate::extract::metadata::{extract_headings, extract_meta, extract_title, word_count};
use crate::extract::types::{ContentFlags, Image, Link, PageContent};
use crate::url::resolve_reference;
use scraper::{CaseSensitivity, ElementRef, Html};
use url::Url;

/// Maximum number of links reported per page
pub const MAX_LINKS: usize = 50;

/// Maximum number of images reported per page
pub const MAX_IMAGES: usize = 20;

/// Subtrees removed before the main content is located
const PRUNED_TAGS: &[&str] = &["script", "style", "nav", "footer", "aside"];

/// Extracts page content according to `flags`
///
/// # Arguments
///
/// * `document` - The parsed page; left untouched
/// * `base_url` - URL of the page, used to resolve relative references
/// * `flags` - Which optional parts to extract
///
/// # Example
///
/// ```
/// use sumi_scrape::extract::{extract_content, ContentFlags};
/// use sumi_scrape::ParsedDocument;
/// use url::Url;
///
/// let html = r#"<html><head><title>Test</title></head>
///     <body><nav>Menu</nav><main>Hello there</main><a href="/page">Link</a></body></html>"#;
/// let doc = ParsedDocument::parse(html);
/// let base = Url::parse("https://example.com/docs/").unwrap();
/// let content = extract_content(&doc, &base, ContentFlags::default());
///
/// assert_eq!(content.title, "Test");
/// assert_eq!(content.text, "Hello there");
/// assert_eq!(content.word_count, 2);
/// assert_eq!(content.links[0].url, "https://example.com/page");
/// ```
pub fn extract_content(document: &ParsedDocument, base_url: &Url, flags: ContentFlags) -> PageContent {
    let mut content = PageContent {
        title: extract_title(document),
        ..Default::default()
    };

    if flags.content {
        content.text = extract_main_text(document);
        content.word_count = word_count(&content.text);
    }

    if flags.links {
        content.links = extract_links(document, base_url);
    }

    if flags.images {
        content.images = extract_images(document, base_url);
    }

    content.meta = extract_meta(document);
    content.headings = extract_headings(document);

    content
}

/// Trimmed text of the main content region, empty if none was found
pub fn extract_main_text(document: &ParsedDocument) -> String {
    let working = pruned_copy(document.html());

    find_main_container(&working)
        .map(|container| element_text(&container))
        .unwrap_or_default()
}

/// Clones the tree and detaches every pruned subtree from the clone
fn pruned_copy(html: &Html) -> Html {
    let mut working = html.clone();

    let pruned: Vec<_> = working
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|element| PRUNED_TAGS.contains(&element.value().name()))
        .map(|element| element.id())
        .collect();

    for id in pruned {
        if let Some(mut node) = working.tree.get_mut(id) {
            node.detach();
        }
    }

    working
}

/// Applies the main content heuristic to an already pruned tree
///
/// Walks from the root so detached subtrees are never considered.
fn find_main_container(working: &Html) -> Option<ElementRef<'_>> {
    let elements = || {
        working
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
    };

    elements()
        .find(|element| element.value().name() == "main")
        .or_else(|| elements().find(|element| element.value().name() == "article"))
        .or_else(|| {
            elements().find(|element| {
                element
                    .value()
                    .has_class("content", CaseSensitivity::CaseSensitive)
            })
        })
        .or_else(|| elements().find(|element| element.value().name() == "body"))
}

/// Extracts links with a non-empty href and non-empty visible text
///
/// Capped at [`MAX_LINKS`], document order.
pub fn extract_links(document: &ParsedDocument, base_url: &Url) -> Vec<Link> {
    document
        .find_with_attr("a", "href")
        .into_iter()
        .filter_map(|anchor| {
            let href = anchor.value().attr("href")?.trim();
            let text = element_text(&anchor);
            if href.is_empty() || text.is_empty() {
                return None;
            }

            Some(Link {
                url: resolve_reference(href, base_url),
                text,
                title: anchor.value().attr("title").unwrap_or_default().to_string(),
            })
        })
        .take(MAX_LINKS)
        .collect()
}

/// Extracts images with a non-empty src
///
/// Capped at [`MAX_IMAGES`], document order. Width and height are carried
/// through as the raw attribute strings.
pub fn extract_images(document: &ParsedDocument, base_url: &Url) -> Vec<Image> {
    document
        .find_with_attr("img", "src")
        .into_iter()
        .filter_map(|img| {
            let attrs = img.value();
            let src = attrs.attr("src")?.trim();
            if src.is_empty() {
                return None;
            }

            let attr = |name: &str| attrs.attr(name).unwrap_or_default().to_string();
            Some(Image {
                src: resolve_reference(src, base_url),
                alt: attr("alt"),
                title: attr("title"),
                width: attr("width"),
                height: attr("height"),
            })
        })
        .take(MAX_IMAGES)
        .collect()
}
