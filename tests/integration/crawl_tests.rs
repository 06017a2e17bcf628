//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and exercise
//! crawl, extract and analyze end-to-end over real HTTP.

use std::collections::HashMap;
use std::time::{Duration, Instant};
use sumi_scrape::config::{TransportConfig, TransportStrategy};
use sumi_scrape::crawler::{CrawlRequest, Crawler};
use sumi_scrape::{FieldValue, ScrapeError, TransportKind};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ARTICLE: &str = r#"<html>
<head>
    <title>Field Notes</title>
    <meta name="description" content="First description">
    <meta property="og:title" content="Field Notes OG">
    <meta name="description" content="Second description">
</head>
<body>
    <nav><a href="/home">Home</a></nav>
    <h2 id="intro">Intro</h2>
    <article>
        <h1>Notes from the field</h1>
        <p>Seven words of main article text here.</p>
        <script>var ignored = "not text";</script>
    </article>
    <h3>Appendix</h3>
    <a href="/about">About us</a>
    <a href="/empty"></a>
    <a href="https://other.example/x" title="Elsewhere">Elsewhere</a>
    <img src="/img/a.png" alt="A" width="640" height="480">
    <img src="">
    <footer>Footer words that should not count</footer>
</body>
</html>"#;

/// Creates a transport configuration for the given strategy
fn transport_config(strategy: TransportStrategy) -> TransportConfig {
    TransportConfig {
        strategy,
        ..TransportConfig::default()
    }
}

/// Builds a request with the shortest allowed delay
fn quick_request(url: String) -> CrawlRequest {
    CrawlRequest {
        delay_ms: 500,
        timeout_s: 5,
        ..CrawlRequest::new(url)
    }
}

async fn serve_html(server: &MockServer, at: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/html"))
        .mount(server)
        .await;
}

async fn assert_article_crawl(strategy: TransportStrategy, expected_kind: TransportKind) {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    serve_html(&mock_server, "/post", ARTICLE).await;

    let crawler = Crawler::new(&transport_config(strategy)).expect("Failed to create crawler");
    assert_eq!(crawler.transport_kind(), expected_kind);

    let url = format!("{}/post", base_url);
    let result = crawler.crawl(&quick_request(url.clone())).await;
    let page = result.page().expect("Crawl should succeed");

    assert_eq!(page.url, url);
    assert_eq!(page.status_code, 200);
    assert!(
        page.content_type.starts_with("text/html"),
        "unexpected content type: {}",
        page.content_type
    );
    assert_eq!(page.title, "Field Notes");
    let text: Vec<&str> = page.text.split_whitespace().collect();
    assert_eq!(
        text.join(" "),
        "Notes from the field Seven words of main article text here."
    );
    assert_eq!(page.word_count, 11);
    assert_eq!(page.raw_html, ARTICLE);

    // Links come from the whole page, nav included; the empty anchor is skipped
    let links: Vec<&str> = page.links.iter().map(|l| l.url.as_str()).collect();
    assert_eq!(
        links,
        vec![
            format!("{}/home", base_url).as_str(),
            format!("{}/about", base_url).as_str(),
            "https://other.example/x",
        ]
    );
    assert_eq!(page.links[2].title, "Elsewhere");

    assert_eq!(page.images.len(), 1);
    assert_eq!(page.images[0].src, format!("{}/img/a.png", base_url));
    assert_eq!(page.images[0].width, "640");

    // Later duplicate meta keys win
    assert_eq!(page.meta["description"], "Second description");
    assert_eq!(page.meta["og:title"], "Field Notes OG");

    let headings: Vec<(u8, &str)> = page
        .headings
        .iter()
        .map(|h| (h.level, h.text.as_str()))
        .collect();
    assert_eq!(
        headings,
        vec![(2, "Intro"), (1, "Notes from the field"), (3, "Appendix")]
    );
    assert_eq!(page.headings[0].id, "intro");
    assert_eq!(page.headings[1].id, "");

    crawler.shutdown().await;
}

#[tokio::test]
async fn test_crawl_with_pooled_transport() {
    assert_article_crawl(TransportStrategy::Pooled, TransportKind::Pooled).await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_crawl_with_blocking_transport() {
    assert_article_crawl(TransportStrategy::Blocking, TransportKind::Blocking).await;
}

#[tokio::test]
async fn test_auto_strategy_prefers_pooled() {
    let crawler = Crawler::new(&TransportConfig::default()).expect("Failed to create crawler");
    assert_eq!(crawler.transport_kind(), TransportKind::Pooled);
}

#[tokio::test]
async fn test_configured_headers_are_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("user-agent", "SumiTest/1.0"))
        .and(header("accept-language", "en"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<title>ok</title>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = TransportConfig {
        user_agent: "SumiTest/1.0".to_string(),
        accept_language: "en".to_string(),
        ..TransportConfig::default()
    };
    let crawler = Crawler::new(&config).expect("Failed to create crawler");
    let result = crawler
        .crawl(&quick_request(format!("{}/", mock_server.uri())))
        .await;

    assert!(result.is_success(), "unexpected error: {:?}", result.error());
}

#[tokio::test]
async fn test_http_error_yields_error_result() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("<title>gone</title>"))
        .mount(&mock_server)
        .await;

    let crawler = Crawler::new(&TransportConfig::default()).expect("Failed to create crawler");
    let url = format!("{}/missing", mock_server.uri());

    // Failures skip the post-crawl delay
    let started = Instant::now();
    let result = crawler
        .crawl(&CrawlRequest {
            delay_ms: 10_000,
            ..quick_request(url.clone())
        })
        .await;
    assert!(started.elapsed() < Duration::from_secs(5));

    assert!(!result.is_success());
    assert_eq!(result.url(), url);
    assert_eq!(result.error(), Some("HTTP 404: Not Found"));

    // The error shape carries no content fields
    let json = serde_json::to_value(&result).expect("Failed to serialize result");
    let object = json.as_object().expect("Result should be an object");
    assert!(object.contains_key("processing_time"));
    assert!(!object.contains_key("title"));
    assert!(!object.contains_key("links"));
}

#[tokio::test]
async fn test_unreachable_host_yields_error_result() {
    let crawler = Crawler::new(&TransportConfig::default()).expect("Failed to create crawler");

    // Nothing listens on the discard port
    let result = crawler
        .crawl(&quick_request("http://127.0.0.1:9/".to_string()))
        .await;

    assert!(!result.is_success());
    assert!(result.error().is_some());
}

#[tokio::test]
async fn test_invalid_request_never_fetches() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let crawler = Crawler::new(&TransportConfig::default()).expect("Failed to create crawler");
    let result = crawler
        .crawl(&CrawlRequest {
            timeout_s: 1,
            ..quick_request(format!("{}/", mock_server.uri()))
        })
        .await;

    assert!(result.error().expect("Request should be rejected").contains("timeout"));
}

#[tokio::test]
async fn test_delay_applies_after_success() {
    let mock_server = MockServer::start().await;
    serve_html(&mock_server, "/", "<title>Slow down</title>").await;

    let crawler = Crawler::new(&TransportConfig::default()).expect("Failed to create crawler");
    let request = CrawlRequest {
        delay_ms: 1000,
        ..quick_request(format!("{}/", mock_server.uri()))
    };

    let started = Instant::now();
    let result = crawler.crawl(&request).await;

    assert!(result.is_success());
    assert!(started.elapsed() >= Duration::from_millis(1000));
    // Processing time is measured before the delay
    assert!(result.processing_time_s() < 1.0);
}

#[tokio::test]
async fn test_redirects_follow_flag() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/guide/index.html"))
        .mount(&mock_server)
        .await;

    serve_html(
        &mock_server,
        "/guide/index.html",
        r#"<title>Guide</title><a href="next.html">Next</a>"#,
    )
    .await;

    let crawler = Crawler::new(&TransportConfig::default()).expect("Failed to create crawler");
    let url = format!("{}/old", base_url);

    let followed = crawler.crawl(&quick_request(url.clone())).await;
    let page = followed.page().expect("Redirect should be followed");
    assert_eq!(page.title, "Guide");
    // Relative links resolve against where the page ended up
    assert_eq!(page.links[0].url, format!("{}/guide/next.html", base_url));

    let refused = crawler
        .crawl(&CrawlRequest {
            follow_redirects: false,
            ..quick_request(url)
        })
        .await;
    assert!(refused
        .error()
        .expect("Redirect should not be followed")
        .starts_with("HTTP 302"));
}

#[tokio::test]
async fn test_disabled_extractors_leave_fields_empty() {
    let mock_server = MockServer::start().await;
    serve_html(&mock_server, "/post", ARTICLE).await;

    let crawler = Crawler::new(&TransportConfig::default()).expect("Failed to create crawler");
    let result = crawler
        .crawl(&CrawlRequest {
            extract_content: false,
            extract_links: false,
            extract_images: false,
            ..quick_request(format!("{}/post", mock_server.uri()))
        })
        .await;

    let page = result.page().expect("Crawl should succeed");
    assert_eq!(page.text, "");
    assert_eq!(page.word_count, 0);
    assert!(page.links.is_empty());
    assert!(page.images.is_empty());
    // Title, meta and headings are always extracted
    assert_eq!(page.title, "Field Notes");
    assert_eq!(page.headings.len(), 3);
    assert_eq!(page.meta.len(), 2);
}

#[tokio::test]
async fn test_extract_by_selector() {
    let mock_server = MockServer::start().await;
    serve_html(
        &mock_server,
        "/list",
        r#"<html><body>
            <h1>Catalog</h1>
            <ul><li class="item">One</li><li class="item">Two</li></ul>
        </body></html>"#,
    )
    .await;

    let crawler = Crawler::new(&TransportConfig::default()).expect("Failed to create crawler");
    let selectors = HashMap::from([
        ("heading".to_string(), "h1".to_string()),
        ("items".to_string(), "li.item".to_string()),
        ("price".to_string(), ".price".to_string()),
    ]);

    let fields = crawler
        .extract(&format!("{}/list", mock_server.uri()), &selectors)
        .await
        .expect("Extraction should succeed");

    assert_eq!(fields.len(), 3);
    assert_eq!(fields["heading"], FieldValue::Single("Catalog".to_string()));
    assert_eq!(
        fields["items"],
        FieldValue::Multiple(vec!["One".to_string(), "Two".to_string()])
    );
    assert_eq!(fields["price"], FieldValue::NoMatch);

    let json = serde_json::to_value(&fields).expect("Failed to serialize fields");
    assert!(json["price"].is_null());
    assert_eq!(json["heading"], "Catalog");
}

#[tokio::test]
async fn test_extract_rejects_invalid_selector() {
    let mock_server = MockServer::start().await;
    serve_html(&mock_server, "/", "<p>x</p>").await;

    let crawler = Crawler::new(&TransportConfig::default()).expect("Failed to create crawler");
    let selectors = HashMap::from([("broken".to_string(), "p[".to_string())]);

    let err = crawler
        .extract(&format!("{}/", mock_server.uri()), &selectors)
        .await
        .expect_err("Invalid selector should fail");
    assert!(matches!(err, ScrapeError::Selector { .. }));
}

#[tokio::test]
async fn test_analyze_counts_whole_document() {
    let mock_server = MockServer::start().await;
    serve_html(&mock_server, "/post", ARTICLE).await;

    let crawler = Crawler::new(&TransportConfig::default()).expect("Failed to create crawler");
    let url = format!("{}/post", mock_server.uri());

    let analysis = crawler.analyze(&url).await.expect("Analysis should succeed");
    assert_eq!(analysis.url, url);
    assert_eq!(analysis.title, "Field Notes");
    assert_eq!(analysis.headings.h1, 1);
    assert_eq!(analysis.headings.h2, 1);
    assert_eq!(analysis.headings.h3, 1);
    assert_eq!(analysis.elements.paragraphs, 1);
    assert_eq!(analysis.elements.links, 4);
    assert_eq!(analysis.elements.images, 2);

    // The analyzer counts navigation and footer text too
    let crawled = crawler.crawl(&quick_request(url)).await;
    let page = crawled.page().expect("Crawl should succeed");
    assert!(analysis.word_count > page.word_count);
}

#[tokio::test]
async fn test_extract_and_analyze_propagate_http_errors() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let crawler = Crawler::new(&TransportConfig::default()).expect("Failed to create crawler");
    let url = format!("{}/", mock_server.uri());

    let err = crawler
        .extract(&url, &HashMap::new())
        .await
        .expect_err("Extraction should fail");
    assert!(matches!(err, ScrapeError::HttpStatus { status: 500, .. }));

    let err = crawler.analyze(&url).await.expect_err("Analysis should fail");
    assert!(err.is_transport());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_crawls_share_transport() {
    let mock_server = MockServer::start().await;

    for i in 0..8 {
        serve_html(
            &mock_server,
            &format!("/page{}", i),
            &format!("<title>Page {}</title>", i),
        )
        .await;
    }

    let crawler = Crawler::new(&TransportConfig::default()).expect("Failed to create crawler");

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let crawler = crawler.clone();
            let url = format!("{}/page{}", mock_server.uri(), i);
            tokio::spawn(async move { crawler.crawl(&quick_request(url)).await })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let result = handle.await.expect("Crawl task panicked");
        let page = result.page().expect("Crawl should succeed");
        assert_eq!(page.title, format!("Page {}", i));
    }
}

#[tokio::test]
async fn test_shutdown_rejects_new_fetches() {
    let mock_server = MockServer::start().await;
    serve_html(&mock_server, "/", "<title>Late</title>").await;

    let crawler = Crawler::new(&TransportConfig::default()).expect("Failed to create crawler");
    crawler.shutdown().await;

    let result = crawler
        .crawl(&quick_request(format!("{}/", mock_server.uri())))
        .await;
    assert!(result
        .error()
        .expect("Fetch after shutdown should fail")
        .contains("shut down"));
}
