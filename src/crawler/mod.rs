//! Page crawling
//!
//! This module contains the bounded crawl pipeline:
//! - Building the shared HTTP client and crawl context
//! - Fetching single pages gated by robots.txt and rate limiting
//! - Extracting title, description, content, and keywords from HTML
//! - Orchestrating capped, concurrency-bounded multi-page crawls

mod extractor;
mod fetcher;
mod orchestrator;

pub use extractor::{extract_content, ExtractedContent};
pub use fetcher::{PageError, PageFetcher, ScrapedPage};
pub use orchestrator::{CrawlOrchestrator, CrawlResult, FailedPage};

use crate::config::{Config, UserAgentConfig};
use crate::limiter::DomainRateLimiter;
use crate::robots::RobotsCache;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

/// Builds the shared HTTP client
///
/// The client carries the crawler's user agent on every request and applies
/// the configured timeout to page, robots.txt, and provider calls alike.
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Shared crawl state, constructed once and passed around explicitly
///
/// Holds everything that must be process-wide: the HTTP client, the robots
/// policy cache, the per-domain rate limiter, and the global fetch semaphore.
/// Keeping this in one registry object (instead of ambient globals) lets
/// tests run isolated contexts in parallel. All of it is process-local; a
/// multi-instance deployment has independent state per instance.
pub struct CrawlContext {
    /// Shared HTTP client for pages and robots.txt
    pub client: Client,

    /// Per-domain robots.txt policies
    pub robots: Arc<RobotsCache>,

    /// Per-domain request spacing
    pub limiter: Arc<DomainRateLimiter>,

    /// Global cap on concurrent in-flight page fetches
    pub fetch_permits: Arc<Semaphore>,

    /// Scraped content is truncated to this many characters
    pub max_content_length: usize,

    /// Default page cap per crawled domain
    pub max_pages_per_domain: usize,
}

impl CrawlContext {
    /// Creates the context from configuration
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let timeout = Duration::from_secs(config.crawler.request_timeout_secs);
        let client = build_http_client(&config.user_agent, timeout)?;

        let robots = Arc::new(RobotsCache::new(
            client.clone(),
            config.user_agent.product_token(),
            config.crawler.robots_ttl_hours,
            config.crawler.fail_closed_robots,
        ));

        let limiter = Arc::new(DomainRateLimiter::new(config.crawler.requests_per_second));
        let fetch_permits = Arc::new(Semaphore::new(
            config.crawler.max_concurrent_fetches as usize,
        ));

        Ok(Self {
            client,
            robots,
            limiter,
            fetch_permits,
            max_content_length: config.crawler.max_content_length,
            max_pages_per_domain: config.crawler.max_pages_per_domain as usize,
        })
    }
}
