//! Result types produced by the extractors

use serde::Serialize;
use std::collections::BTreeMap;

/// Meta tags keyed by `name` or `property`; later duplicates win
pub type MetaTags = BTreeMap<String, String>;

/// A hyperlink found in the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    /// Absolute URL (resolved against the page URL)
    pub url: String,

    /// Visible anchor text, never empty
    pub text: String,

    /// `title` attribute, empty if absent
    pub title: String,
}

/// An image found in the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Image {
    /// Absolute image URL
    pub src: String,
    pub alt: String,
    pub title: String,
    /// Raw `width` attribute, not parsed
    pub width: String,
    /// Raw `height` attribute, not parsed
    pub height: String,
}

/// A heading element (`h1`..`h6`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Heading {
    /// 1 through 6
    pub level: u8,
    pub text: String,
    /// `id` attribute, empty if absent
    pub id: String,
}

/// Which optional parts of the page content to extract
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentFlags {
    pub content: bool,
    pub links: bool,
    pub images: bool,
}

impl Default for ContentFlags {
    fn default() -> Self {
        Self {
            content: true,
            links: true,
            images: true,
        }
    }
}

/// Fields derived by the content extractor
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PageContent {
    pub title: String,
    /// Main content text (empty unless content extraction was requested)
    pub text: String,
    /// Whitespace-delimited tokens in `text`
    pub word_count: usize,
    pub links: Vec<Link>,
    pub images: Vec<Image>,
    pub meta: MetaTags,
    pub headings: Vec<Heading>,
}

/// Value extracted for one selector field
///
/// Serializes as a string, an array of strings, or `null` for no match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Exactly one element matched
    Single(String),
    /// Two or more elements matched, in document order
    Multiple(Vec<String>),
    /// Nothing matched
    NoMatch,
}

impl FieldValue {
    pub fn is_no_match(&self) -> bool {
        matches!(self, Self::NoMatch)
    }
}

/// One value per requested selector field
pub type SelectorExtractionResult = BTreeMap<String, FieldValue>;

/// Heading counts per level
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HeadingCounts {
    pub h1: usize,
    pub h2: usize,
    pub h3: usize,
    pub h4: usize,
    pub h5: usize,
    pub h6: usize,
}

impl HeadingCounts {
    /// Adds one heading of `level` (1-6); other levels are ignored
    pub fn record(&mut self, level: u8) {
        match level {
            1 => self.h1 += 1,
            2 => self.h2 += 1,
            3 => self.h3 += 1,
            4 => self.h4 += 1,
            5 => self.h5 += 1,
            6 => self.h6 += 1,
            _ => {}
        }
    }

    pub fn total(&self) -> usize {
        self.h1 + self.h2 + self.h3 + self.h4 + self.h5 + self.h6
    }
}

/// Element tallies over the whole document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ElementCounts {
    pub paragraphs: usize,
    pub links: usize,
    pub images: usize,
    /// `ul` and `ol` combined
    pub lists: usize,
    pub tables: usize,
    pub forms: usize,
}

/// Structural analysis of a page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub url: String,
    pub title: String,
    pub headings: HeadingCounts,
    pub elements: ElementCounts,
    /// Whitespace-delimited tokens over the entire document text
    pub word_count: usize,
    pub meta: MetaTags,
    /// Every heading, in document order
    pub structure: Vec<Heading>,
}
