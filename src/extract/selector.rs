//! Selector-driven field extraction
//!
//! Evaluates a caller-supplied mapping of field name → CSS selector against
//! the whole document. Every selector is compiled before any is evaluated,
//! so one invalid selector fails the call without partial results.

use crate::document::{compile_selector, element_text, ParsedDocument};
use crate::extract::types::{FieldValue, SelectorExtractionResult};
use crate::ScrapeError;
use scraper::Selector;
use std::collections::HashMap;

/// Extracts one value per requested field
///
/// # Value Shapes
///
/// | Matches | Value |
/// |---------|-------|
/// | 0 | [`FieldValue::NoMatch`] |
/// | 1 | [`FieldValue::Single`] with the trimmed text |
/// | 2+ | [`FieldValue::Multiple`], document order |
///
/// # Returns
///
/// * `Ok(SelectorExtractionResult)` - One entry per requested field
/// * `Err(ScrapeError::Selector)` - A selector could not be parsed
pub fn extract_by_selector(
    document: &ParsedDocument,
    selectors: &HashMap<String, String>,
) -> Result<SelectorExtractionResult, ScrapeError> {
    let compiled = selectors
        .iter()
        .map(|(field, css)| Ok((field.clone(), compile_selector(css)?)))
        .collect::<Result<Vec<(String, Selector)>, ScrapeError>>()?;

    Ok(compiled
        .into_iter()
        .map(|(field, selector)| {
            let value = field_value(document, &selector);
            (field, value)
        })
        .collect())
}

fn field_value(document: &ParsedDocument, selector: &Selector) -> FieldValue {
    let mut texts: Vec<String> = document
        .select_compiled(selector)
        .iter()
        .map(element_text)
        .collect();

    match texts.len() {
        0 => FieldValue::NoMatch,
        1 => FieldValue::Single(texts.remove(0)),
        _ => FieldValue::Multiple(texts),
    }
}
