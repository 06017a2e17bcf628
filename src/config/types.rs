use serde::Deserialize;

/// Browser user agent applied to every outgoing request
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Accept header sent with every request
pub const DEFAULT_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Accept-Language header sent with every request
pub const DEFAULT_ACCEPT_LANGUAGE: &str = "pt-BR,pt;q=0.9,en;q=0.8";

/// Main configuration structure for Sumi-Scrape
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub transport: TransportConfig,
    #[serde(default)]
    pub crawl: CrawlDefaults,
}

/// Which transport variant to use for the lifetime of the process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportStrategy {
    /// Pooled client, falling back to blocking if it cannot be built
    #[default]
    Auto,
    /// Pooled client only; failing to build it is a start-up error
    Pooled,
    /// Stateless synchronous fetch only
    Blocking,
}

/// HTTP transport configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TransportConfig {
    pub strategy: TransportStrategy,

    /// User-Agent header value
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Accept header value
    pub accept: String,

    /// Accept-Language header value
    #[serde(rename = "accept-language")]
    pub accept_language: String,

    /// Maximum number of simultaneous connections across all hosts
    #[serde(rename = "max-connections")]
    pub max_connections: usize,

    /// Maximum number of simultaneous connections to one scheme/host/port
    #[serde(rename = "max-connections-per-host")]
    pub max_connections_per_host: usize,

    /// Client-wide total timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Maximum redirect hops when redirects are followed
    #[serde(rename = "max-redirects")]
    pub max_redirects: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            strategy: TransportStrategy::Auto,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept: DEFAULT_ACCEPT.to_string(),
            accept_language: DEFAULT_ACCEPT_LANGUAGE.to_string(),
            max_connections: 100,
            max_connections_per_host: 10,
            timeout_secs: 30,
            max_redirects: 10,
        }
    }
}

/// Defaults applied to crawl requests built from the CLI
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CrawlDefaults {
    pub depth: u32,

    #[serde(rename = "delay-ms")]
    pub delay_ms: u64,

    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    #[serde(rename = "extract-content")]
    pub extract_content: bool,

    #[serde(rename = "extract-links")]
    pub extract_links: bool,

    #[serde(rename = "extract-images")]
    pub extract_images: bool,

    #[serde(rename = "follow-redirects")]
    pub follow_redirects: bool,
}

impl Default for CrawlDefaults {
    fn default() -> Self {
        Self {
            depth: 1,
            delay_ms: 1000,
            timeout_secs: 30,
            extract_content: true,
            extract_links: true,
            extract_images: true,
            follow_redirects: true,
        }
    }
}
