//! Single-page fetching
//!
//! Fetches one URL gated by robots.txt and the per-domain rate limiter, then
//! extracts its content. Every failure mode is captured on the returned
//! [`ScrapedPage`] as data; `fetch` itself never returns an error, which is
//! what lets a batch keep moving past individual bad pages.

use crate::crawler::{extract_content, CrawlContext};
use crate::limiter::DomainRateLimiter;
use crate::robots::RobotsCache;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use url::Url;

/// Why a page fetch produced no usable content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum PageError {
    /// robots.txt disallows this URL for our user agent
    RobotsBlocked,

    /// The request exceeded the configured timeout
    Timeout,

    /// The server answered with a non-success status
    HttpStatus(u16),

    /// Connection-level failure (refused, reset, DNS, TLS)
    Network(String),

    /// The URL or response could not be interpreted
    Parse(String),
}

impl fmt::Display for PageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageError::RobotsBlocked => write!(f, "disallowed by robots.txt"),
            PageError::Timeout => write!(f, "request timed out"),
            PageError::HttpStatus(code) => write!(f, "HTTP {}", code),
            PageError::Network(detail) => write!(f, "network error: {}", detail),
            PageError::Parse(detail) => write!(f, "parse error: {}", detail),
        }
    }
}

/// Content harvested from one URL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapedPage {
    /// The URL as requested
    pub url: String,

    /// Page title, empty when absent
    pub title: String,

    /// Description meta tag value, empty when absent
    pub meta_description: String,

    /// Main content text, length-capped
    pub content: String,

    /// Keywords derived from headings and frequent words
    pub keywords: Vec<String>,

    /// HTTP status, or 0 when no request was issued
    pub status_code: u16,

    /// Set when the fetch produced no usable content
    pub error: Option<PageError>,
}

impl ScrapedPage {
    /// Builds a page record representing a failed fetch
    pub fn failed(url: &str, status_code: u16, error: PageError) -> Self {
        Self {
            url: url.to_string(),
            title: String::new(),
            meta_description: String::new(),
            content: String::new(),
            keywords: Vec::new(),
            status_code,
            error: Some(error),
        }
    }

    /// A page counts as harvested only with a 200 and non-empty content
    pub fn is_success(&self) -> bool {
        self.error.is_none() && self.status_code == 200 && !self.content.is_empty()
    }
}

/// Fetches and extracts single pages under crawl etiquette
pub struct PageFetcher {
    client: Client,
    robots: Arc<RobotsCache>,
    limiter: Arc<DomainRateLimiter>,
    max_content_length: usize,
}

impl PageFetcher {
    /// Creates a fetcher from the shared crawl context
    pub fn from_context(context: &CrawlContext) -> Self {
        Self {
            client: context.client.clone(),
            robots: context.robots.clone(),
            limiter: context.limiter.clone(),
            max_content_length: context.max_content_length,
        }
    }

    /// Fetches one URL and extracts its content
    ///
    /// Order of gates: robots.txt first (a disallowed URL costs zero network
    /// calls beyond the cached robots.txt itself), then the domain rate
    /// limiter, then a single GET. All failures come back as data on the
    /// returned page.
    pub async fn fetch(&self, raw_url: &str) -> ScrapedPage {
        let url = match Url::parse(raw_url) {
            Ok(url) => url,
            Err(e) => return ScrapedPage::failed(raw_url, 0, PageError::Parse(e.to_string())),
        };

        let domain = match authority(&url) {
            Some(domain) => domain,
            None => {
                return ScrapedPage::failed(
                    raw_url,
                    0,
                    PageError::Parse("URL has no host".to_string()),
                )
            }
        };

        let policy = self.robots.policy_for(&url).await;
        if !policy.is_allowed(url.as_str(), self.robots.product_token()) {
            tracing::info!("Skipping {} (disallowed by robots.txt)", url);
            return ScrapedPage::failed(raw_url, 0, PageError::RobotsBlocked);
        }

        let crawl_delay = policy.crawl_delay(self.robots.product_token());
        self.limiter.wait_turn(&domain, crawl_delay).await;

        tracing::debug!("Fetching {}", url);
        let response = match self.client.get(url.clone()).send().await {
            Ok(response) => response,
            Err(e) => return ScrapedPage::failed(raw_url, 0, classify_request_error(e)),
        };

        let status = response.status();
        if !status.is_success() {
            return ScrapedPage::failed(
                raw_url,
                status.as_u16(),
                PageError::HttpStatus(status.as_u16()),
            );
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return ScrapedPage::failed(raw_url, status.as_u16(), classify_request_error(e))
            }
        };

        let extracted = extract_content(&body, self.max_content_length);

        ScrapedPage {
            url: raw_url.to_string(),
            title: extracted.title,
            meta_description: extracted.meta_description,
            content: extracted.content,
            keywords: extracted.keywords,
            status_code: status.as_u16(),
            error: None,
        }
    }
}

/// Maps a reqwest failure onto the page error taxonomy
fn classify_request_error(error: reqwest::Error) -> PageError {
    if error.is_timeout() {
        PageError::Timeout
    } else if error.is_connect() {
        PageError::Network(format!("connection failed: {}", error))
    } else {
        PageError::Network(error.to_string())
    }
}

/// Host plus explicit port, used as the rate-limiter and robots cache key
fn authority(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}
