use url::Url;

/// Resolves a reference found in a page against the page's own URL
///
/// Resolution follows RFC 3986: a root-relative reference such as `/a/b`
/// replaces the whole path of the base, a path-relative one is merged with
/// the base directory, and absolute references come back unchanged.
///
/// The reference is returned verbatim (trimmed) when it cannot be resolved,
/// so unusual schemes and malformed values are still reported rather than
/// silently dropped.
///
/// # Examples
///
/// ```
/// use sumi_scrape::url::resolve_reference;
/// use url::Url;
///
/// let base = Url::parse("https://x.com/p/q").unwrap();
/// assert_eq!(resolve_reference("/a/b", &base), "https://x.com/a/b");
/// assert_eq!(resolve_reference("r", &base), "https://x.com/p/r");
/// ```
pub fn resolve_reference(reference: &str, base_url: &Url) -> String {
    let reference = reference.trim();

    match base_url.join(reference) {
        Ok(absolute) => absolute.to_string(),
        Err(_) => reference.to_string(),
    }
}
