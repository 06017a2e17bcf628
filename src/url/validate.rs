use crate::UrlError;
use url::Url;

/// Parses and validates a URL that is about to be fetched
///
/// # Validation Steps
///
/// 1. Parse the URL; reject if malformed or relative
/// 2. Only `http` and `https` schemes are accepted
/// 3. The URL must name a host
///
/// Unlike crawlers that canonicalize URLs before fetching, the URL is
/// otherwise left exactly as the caller supplied it: the page is fetched at,
/// and reported under, that address.
///
/// # Examples
///
/// ```
/// use sumi_scrape::url::parse_page_url;
///
/// let url = parse_page_url("https://example.com/docs/intro").unwrap();
/// assert_eq!(url.host_str(), Some("example.com"));
/// assert!(parse_page_url("ftp://example.com/file").is_err());
/// ```
pub fn parse_page_url(url_str: &str) -> Result<Url, UrlError> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(UrlError::MissingDomain),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_http_and_https() {
        assert!(parse_page_url("http://example.com/page").is_ok());
        assert!(parse_page_url("https://example.com/page").is_ok());
    }

    #[test]
    fn test_url_kept_as_given() {
        let url = parse_page_url("https://Example.com/a/b/?q=1#frag").unwrap();
        assert_eq!(url.as_str(), "https://example.com/a/b/?q=1#frag");
    }

    #[test]
    fn test_invalid_scheme() {
        let result = parse_page_url("ftp://example.com/page");
        assert!(matches!(result.unwrap_err(), UrlError::InvalidScheme(_)));

        let result = parse_page_url("mailto:someone@example.com");
        assert!(matches!(result.unwrap_err(), UrlError::InvalidScheme(_)));
    }

    #[test]
    fn test_relative_url_rejected() {
        let result = parse_page_url("/just/a/path");
        assert!(matches!(result.unwrap_err(), UrlError::Parse(_)));
    }

    #[test]
    fn test_malformed_url() {
        assert!(parse_page_url("not a url").is_err());
        assert!(parse_page_url("").is_err());
    }
}
