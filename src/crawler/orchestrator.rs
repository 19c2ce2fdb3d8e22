//! Bounded multi-page crawl orchestration
//!
//! Fans one fetch task out per selected URL under the process-wide fetch
//! semaphore, waits for all of them, and folds the outcomes into a single
//! [`CrawlResult`]. Individual page failures never abort the batch.

use crate::crawler::{CrawlContext, PageError, PageFetcher, ScrapedPage};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Semaphore;

/// A URL that produced no usable content, with the reason
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedPage {
    pub url: String,
    pub error: PageError,
}

/// Aggregated outcome of one bounded crawl
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlResult {
    /// The domain this crawl was about
    pub domain: String,

    /// Pages that returned usable content
    pub pages: Vec<ScrapedPage>,

    /// Pages that did not, with their error tags
    pub failures: Vec<FailedPage>,

    /// All successful page content joined with separators
    pub combined_content: String,

    /// Union of page keywords, de-duplicated in first-seen order
    pub keywords: Vec<String>,

    /// How many fetches were attempted (min of candidates and the cap)
    pub pages_attempted: usize,
}

impl CrawlResult {
    /// Number of pages that returned usable content
    pub fn pages_succeeded(&self) -> usize {
        self.pages.len()
    }

    /// Number of attempted pages that failed
    pub fn pages_failed(&self) -> usize {
        self.failures.len()
    }
}

/// Crawls a capped set of URLs for one domain
///
/// The semaphore bounding in-flight fetches is shared through the
/// [`CrawlContext`], so concurrent `crawl` calls - even for different
/// domains - draw from one process-wide permit pool.
pub struct CrawlOrchestrator {
    fetcher: Arc<PageFetcher>,
    fetch_permits: Arc<Semaphore>,
    default_max_pages: usize,
}

impl CrawlOrchestrator {
    /// Creates an orchestrator bound to the shared crawl context
    pub fn new(context: &CrawlContext) -> Self {
        Self {
            fetcher: Arc::new(PageFetcher::from_context(context)),
            fetch_permits: context.fetch_permits.clone(),
            default_max_pages: context.max_pages_per_domain,
        }
    }

    /// The configured default page cap
    pub fn default_max_pages(&self) -> usize {
        self.default_max_pages
    }

    /// Fetches up to `max_pages` of the candidate URLs and aggregates results
    ///
    /// Candidates are taken in caller order (typically search rank). Every
    /// selected URL is attempted exactly once; a failure on one never reduces
    /// the attempts made on the others.
    pub async fn crawl(
        &self,
        domain: &str,
        candidate_urls: &[String],
        max_pages: usize,
    ) -> CrawlResult {
        let selected: Vec<String> = candidate_urls
            .iter()
            .take(max_pages)
            .cloned()
            .collect();

        tracing::info!(
            "Crawling {} page(s) for {} ({} candidate(s))",
            selected.len(),
            domain,
            candidate_urls.len()
        );

        let mut handles = Vec::with_capacity(selected.len());
        for url in &selected {
            let fetcher = self.fetcher.clone();
            let permits = self.fetch_permits.clone();
            let url = url.clone();

            handles.push(tokio::spawn(async move {
                let _permit = match permits.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        return ScrapedPage::failed(
                            &url,
                            0,
                            PageError::Network("fetch pool closed".to_string()),
                        )
                    }
                };
                fetcher.fetch(&url).await
            }));
        }

        let mut pages = Vec::new();
        let mut failures = Vec::new();

        for (url, handle) in selected.iter().zip(handles) {
            let page = match handle.await {
                Ok(page) => page,
                Err(e) => {
                    tracing::error!("Fetch task for {} panicked: {}", url, e);
                    failures.push(FailedPage {
                        url: url.clone(),
                        error: PageError::Network(format!("fetch task failed: {}", e)),
                    });
                    continue;
                }
            };

            if page.is_success() {
                pages.push(page);
            } else {
                let error = page
                    .error
                    .clone()
                    .unwrap_or_else(|| PageError::Parse("no extractable content".to_string()));
                failures.push(FailedPage {
                    url: page.url,
                    error,
                });
            }
        }

        let combined_content = pages
            .iter()
            .map(|page| page.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        let mut keywords: Vec<String> = Vec::new();
        for page in &pages {
            for keyword in &page.keywords {
                if !keywords.contains(keyword) {
                    keywords.push(keyword.clone());
                }
            }
        }

        tracing::info!(
            "Crawl of {} finished: {} succeeded, {} failed",
            domain,
            pages.len(),
            failures.len()
        );

        CrawlResult {
            domain: domain.to_string(),
            pages,
            failures,
            combined_content,
            keywords,
            pages_attempted: selected.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn orchestrator(max_concurrent: u32) -> CrawlOrchestrator {
        let mut config = Config::default();
        config.crawler.max_concurrent_fetches = max_concurrent;
        config.crawler.requests_per_second = 1000.0;
        let context = CrawlContext::new(&config).unwrap();
        CrawlOrchestrator::new(&context)
    }

    async fn mount_page(server: &MockServer, page_path: &str, title: &str, body: &str) {
        Mock::given(method("GET"))
            .and(path(page_path.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_string(format!(
                "<html><head><title>{}</title></head><body><main>{}</main></body></html>",
                title, body
            )))
            .mount(server)
            .await;
    }

    async fn mount_open_robots(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nAllow: /"))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_crawl_respects_max_pages() {
        let server = MockServer::start().await;
        mount_open_robots(&server).await;
        for i in 0..5 {
            mount_page(&server, &format!("/p{}", i), "T", "page words here").await;
        }

        let urls: Vec<String> = (0..5).map(|i| format!("{}/p{}", server.uri(), i)).collect();
        let result = orchestrator(4).crawl("example.com", &urls, 3).await;

        assert_eq!(result.pages_attempted, 3);
        assert_eq!(result.pages_succeeded() + result.pages_failed(), 3);
    }

    #[tokio::test]
    async fn test_one_failure_does_not_reduce_attempts() {
        let server = MockServer::start().await;
        mount_open_robots(&server).await;
        mount_page(&server, "/ok1", "A", "alpha words").await;
        Mock::given(method("GET"))
            .and(path("/broken"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        mount_page(&server, "/ok2", "B", "beta words").await;

        let urls = vec![
            format!("{}/ok1", server.uri()),
            format!("{}/broken", server.uri()),
            format!("{}/ok2", server.uri()),
        ];
        let result = orchestrator(4).crawl("example.com", &urls, 10).await;

        assert_eq!(result.pages_attempted, 3);
        assert_eq!(result.pages_succeeded(), 2);
        assert_eq!(result.pages_failed(), 1);
        assert_eq!(result.failures[0].error, PageError::HttpStatus(500));
    }

    #[tokio::test]
    async fn test_robots_blocked_pages_count_as_failures() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /private"),
            )
            .mount(&server)
            .await;
        mount_page(&server, "/open", "Open", "open words").await;

        let urls = vec![
            format!("{}/open", server.uri()),
            format!("{}/private/x", server.uri()),
        ];
        let result = orchestrator(4).crawl("example.com", &urls, 10).await;

        assert_eq!(result.pages_succeeded(), 1);
        assert_eq!(result.pages_failed(), 1);
        assert_eq!(result.failures[0].error, PageError::RobotsBlocked);
    }

    #[tokio::test]
    async fn test_combined_content_and_keyword_union() {
        let server = MockServer::start().await;
        mount_open_robots(&server).await;
        mount_page(&server, "/a", "A", "shared words alpha alpha alpha").await;
        mount_page(&server, "/b", "B", "shared words beta beta beta").await;

        let urls = vec![
            format!("{}/a", server.uri()),
            format!("{}/b", server.uri()),
        ];
        let result = orchestrator(4).crawl("example.com", &urls, 10).await;

        assert!(result.combined_content.contains("alpha"));
        assert!(result.combined_content.contains("beta"));

        // Union is de-duplicated
        let shared_count = result
            .keywords
            .iter()
            .filter(|k| k.as_str() == "shared")
            .count();
        assert_eq!(shared_count, 1);
    }

    #[tokio::test]
    async fn test_empty_candidate_list() {
        let result = orchestrator(4).crawl("example.com", &[], 10).await;
        assert_eq!(result.pages_attempted, 0);
        assert_eq!(result.pages_succeeded(), 0);
        assert_eq!(result.pages_failed(), 0);
        assert!(result.combined_content.is_empty());
    }
}
