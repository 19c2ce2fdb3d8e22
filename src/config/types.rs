use serde::Deserialize;

/// Main configuration structure for rankscout
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub providers: ProviderConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Hard cap on concurrent page fetches across the whole process
    #[serde(rename = "max-concurrent-fetches", default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: u32,

    /// Default page cap per crawled domain
    #[serde(rename = "max-pages-per-domain", default = "default_max_pages_per_domain")]
    pub max_pages_per_domain: u32,

    /// Default request rate against a single domain when robots.txt gives no crawl-delay
    #[serde(rename = "requests-per-second", default = "default_requests_per_second")]
    pub requests_per_second: f64,

    /// Timeout applied to every outbound request (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Scraped page content is truncated to this many characters
    #[serde(rename = "max-content-length", default = "default_max_content_length")]
    pub max_content_length: usize,

    /// Treat an unreadable robots.txt as deny-all instead of allow-all
    #[serde(rename = "fail-closed-robots", default)]
    pub fail_closed_robots: bool,

    /// How long a fetched robots.txt policy stays fresh (hours)
    #[serde(rename = "robots-ttl-hours", default = "default_robots_ttl_hours")]
    pub robots_ttl_hours: u64,
}

fn default_max_concurrent_fetches() -> u32 {
    5
}

fn default_max_pages_per_domain() -> u32 {
    10
}

fn default_requests_per_second() -> f64 {
    1.0
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_max_content_length() -> usize {
    10_000
}

fn default_robots_ttl_hours() -> u64 {
    24
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: default_max_concurrent_fetches(),
            max_pages_per_domain: default_max_pages_per_domain(),
            requests_per_second: default_requests_per_second(),
            request_timeout_secs: default_request_timeout_secs(),
            max_content_length: default_max_content_length(),
            fail_closed_robots: false,
            robots_ttl_hours: default_robots_ttl_hours(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler; also the product token matched in robots.txt
    #[serde(rename = "crawler-name", default = "default_crawler_name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version", default = "default_crawler_version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url", default = "default_contact_url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email", default = "default_contact_email")]
    pub contact_email: String,
}

fn default_crawler_name() -> String {
    "RankScout".to_string()
}

fn default_crawler_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_contact_url() -> String {
    "https://example.com/rankscout".to_string()
}

fn default_contact_email() -> String {
    "crawler@example.com".to_string()
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: default_crawler_name(),
            crawler_version: default_crawler_version(),
            contact_url: default_contact_url(),
            contact_email: default_contact_email(),
        }
    }
}

impl UserAgentConfig {
    /// Full user agent header value
    ///
    /// Format: `CrawlerName/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }

    /// Product token matched against robots.txt `User-agent` lines
    pub fn product_token(&self) -> &str {
        &self.crawler_name
    }
}

/// Response cache configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Cached provider responses expire after this many hours
    #[serde(rename = "ttl-hours", default = "default_cache_ttl_hours")]
    pub ttl_hours: u64,

    /// Optional SQLite database path; in-memory cache when absent
    #[serde(rename = "sqlite-path", default)]
    pub sqlite_path: Option<String>,
}

fn default_cache_ttl_hours() -> u64 {
    24
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_hours: default_cache_ttl_hours(),
            sqlite_path: None,
        }
    }
}

/// Search provider credentials and endpoints
///
/// Which providers are enabled follows from which credentials are present.
/// Credentials may come from the config file or from the environment
/// (`GOOGLE_CSE_API_KEY`, `GOOGLE_CSE_CX`, `SERPAPI_KEY`); the environment
/// wins. Endpoints are overridable so tests can point at a local server.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    /// Google Custom Search Engine API key
    #[serde(rename = "google-cse-api-key", default)]
    pub google_cse_api_key: Option<String>,

    /// Google Custom Search Engine context (cx) identifier
    #[serde(rename = "google-cse-cx", default)]
    pub google_cse_cx: Option<String>,

    /// SerpApi API key
    #[serde(rename = "serpapi-key", default)]
    pub serpapi_key: Option<String>,

    /// Google CSE endpoint
    #[serde(rename = "google-cse-endpoint", default = "default_google_cse_endpoint")]
    pub google_cse_endpoint: String,

    /// SerpApi endpoint
    #[serde(rename = "serpapi-endpoint", default = "default_serpapi_endpoint")]
    pub serpapi_endpoint: String,
}

fn default_google_cse_endpoint() -> String {
    "https://www.googleapis.com/customsearch/v1".to_string()
}

fn default_serpapi_endpoint() -> String {
    "https://serpapi.com/search".to_string()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            google_cse_api_key: None,
            google_cse_cx: None,
            serpapi_key: None,
            google_cse_endpoint: default_google_cse_endpoint(),
            serpapi_endpoint: default_serpapi_endpoint(),
        }
    }
}
