//! Search provider adapters
//!
//! Each adapter speaks one upstream API and normalizes its response into the
//! common [`DiscoveryResult`] shape at this boundary, so the client never sees
//! provider-specific payloads. The mock provider generates deterministic data
//! for development and tests when no credentials are configured.

use crate::config::Config;
use crate::keywords;
use crate::serp::{DiscoveryQuery, DiscoveryResult, RankedKeyword, RankedUrl};
use crate::{Result, ScoutError};
use reqwest::Client;
use serde_json::Value;

/// Keywords derived per search result, by provider
const CSE_KEYWORDS_PER_RESULT: usize = 5;
const SERPAPI_KEYWORDS_PER_RESULT: usize = 3;

/// An enabled search provider
///
/// Modeled as an enum rather than a trait object: the set of providers is
/// closed, and dispatch stays plain async code.
pub enum Provider {
    GoogleCse(GoogleCse),
    SerpApi(SerpApi),
    Mock(MockProvider),
}

impl Provider {
    /// Builds the provider chain from configured credentials
    ///
    /// Priority order: Google CSE, then SerpApi. With no credentials at all
    /// the deterministic mock provider stands in so development flows work
    /// end to end.
    pub fn from_config(config: &Config, client: Client) -> Vec<Provider> {
        let mut providers = Vec::new();

        if let (Some(api_key), Some(cx)) = (
            config.providers.google_cse_api_key.clone(),
            config.providers.google_cse_cx.clone(),
        ) {
            providers.push(Provider::GoogleCse(GoogleCse {
                client: client.clone(),
                api_key,
                cx,
                endpoint: config.providers.google_cse_endpoint.clone(),
            }));
        }

        if let Some(api_key) = config.providers.serpapi_key.clone() {
            providers.push(Provider::SerpApi(SerpApi {
                client,
                api_key,
                endpoint: config.providers.serpapi_endpoint.clone(),
            }));
        }

        if providers.is_empty() {
            tracing::warn!("No SERP provider credentials configured; using mock data");
            providers.push(Provider::Mock(MockProvider));
        }

        providers
    }

    /// Stable provider name used in logs and cache entries
    pub fn name(&self) -> &'static str {
        match self {
            Provider::GoogleCse(_) => "google_cse",
            Provider::SerpApi(_) => "serpapi",
            Provider::Mock(_) => "mock",
        }
    }

    /// Issues one request against the provider
    pub async fn fetch(&self, query: &DiscoveryQuery) -> Result<DiscoveryResult> {
        match self {
            Provider::GoogleCse(p) => p.fetch(query).await,
            Provider::SerpApi(p) => p.fetch(query).await,
            Provider::Mock(p) => p.fetch(query),
        }
    }
}

/// Google Custom Search Engine adapter
pub struct GoogleCse {
    client: Client,
    api_key: String,
    cx: String,
    endpoint: String,
}

impl GoogleCse {
    pub fn new(client: Client, api_key: &str, cx: &str, endpoint: &str) -> Self {
        Self {
            client,
            api_key: api_key.to_string(),
            cx: cx.to_string(),
            endpoint: endpoint.to_string(),
        }
    }

    async fn fetch(&self, query: &DiscoveryQuery) -> Result<DiscoveryResult> {
        let query_term = format!("site:{}", query.domain);
        let gl = query.country.to_lowercase();

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("key", self.api_key.as_str()),
                ("cx", self.cx.as_str()),
                ("q", query_term.as_str()),
                ("num", "10"),
                ("hl", query.language.as_str()),
                ("gl", gl.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScoutError::Provider {
                provider: "google_cse".to_string(),
                message: format!("HTTP {}", status.as_u16()),
            });
        }

        let data: Value = response.json().await?;
        Ok(normalize_results(
            &query.domain,
            data.get("items"),
            CSE_KEYWORDS_PER_RESULT,
            "google_cse",
            false,
        ))
    }
}

/// SerpApi adapter
pub struct SerpApi {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl SerpApi {
    pub fn new(client: Client, api_key: &str, endpoint: &str) -> Self {
        Self {
            client,
            api_key: api_key.to_string(),
            endpoint: endpoint.to_string(),
        }
    }

    async fn fetch(&self, query: &DiscoveryQuery) -> Result<DiscoveryResult> {
        let mut params = vec![
            ("api_key", self.api_key.clone()),
            ("engine", "google".to_string()),
            ("q", format!("site:{}", query.domain)),
            ("num", "20".to_string()),
            ("hl", query.language.clone()),
            ("gl", query.country.to_lowercase()),
        ];
        if let Some(location) = &query.location {
            params.push(("location", location.clone()));
        }

        let response = self.client.get(&self.endpoint).query(&params).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScoutError::Provider {
                provider: "serpapi".to_string(),
                message: format!("HTTP {}", status.as_u16()),
            });
        }

        let data: Value = response.json().await?;
        Ok(normalize_results(
            &query.domain,
            data.get("organic_results"),
            SERPAPI_KEYWORDS_PER_RESULT,
            "serpapi",
            true,
        ))
    }
}

/// Deterministic provider used when no credentials are configured
///
/// Output depends only on the queried domain, which keeps development and
/// test runs reproducible.
pub struct MockProvider;

impl MockProvider {
    fn fetch(&self, query: &DiscoveryQuery) -> Result<DiscoveryResult> {
        let domain = &query.domain;
        let head = domain.split('.').next().unwrap_or(domain);
        let home = format!("https://{}/", domain);

        let seeds: [(String, Option<u64>, Option<f64>); 5] = [
            (format!("{} services", head), Some(1000), Some(2.5)),
            (format!("{} solutions", head), Some(800), Some(3.2)),
            (format!("best {}", head), Some(600), Some(4.1)),
            (format!("{} reviews", head), Some(400), Some(1.8)),
            (format!("{} pricing", head), Some(350), Some(5.2)),
        ];

        let keywords = seeds
            .into_iter()
            .enumerate()
            .map(|(idx, (keyword, search_volume, cpc))| RankedKeyword {
                keyword,
                position: (idx + 1) as u32,
                url: home.clone(),
                search_volume,
                cpc,
                competition: None,
            })
            .collect();

        let pages = [
            ("", format!("{} - Home", domain)),
            ("about", format!("About {}", domain)),
            ("services", format!("{} Services", domain)),
            ("pricing", format!("{} Pricing", domain)),
            ("contact", format!("Contact {}", domain)),
        ];

        let top_urls = pages
            .into_iter()
            .enumerate()
            .map(|(idx, (path, title))| RankedUrl {
                url: format!("https://{}/{}", domain, path),
                title,
                snippet: None,
                position: (idx + 1) as u32,
            })
            .collect();

        Ok(DiscoveryResult {
            domain: domain.clone(),
            keywords,
            top_urls,
            provider: "mock".to_string(),
        })
    }
}

/// Normalizes a provider's result array into the common shape
///
/// Both upstream APIs use `title`/`snippet`/`link` fields on their result
/// objects; SerpApi additionally reports volume metrics, carried through when
/// `carry_metrics` is set.
fn normalize_results(
    domain: &str,
    items: Option<&Value>,
    keywords_per_result: usize,
    provider: &str,
    carry_metrics: bool,
) -> DiscoveryResult {
    let mut keywords = Vec::new();
    let mut top_urls = Vec::new();

    let items = items.and_then(Value::as_array);
    for (idx, item) in items.into_iter().flatten().enumerate() {
        let position = (idx + 1) as u32;
        let title = item.get("title").and_then(Value::as_str).unwrap_or("");
        let snippet = item.get("snippet").and_then(Value::as_str).unwrap_or("");
        let url = item.get("link").and_then(Value::as_str).unwrap_or("");

        let (search_volume, cpc, competition) = if carry_metrics {
            (
                item.get("search_volume").and_then(Value::as_u64),
                item.get("cpc").and_then(Value::as_f64),
                item.get("competition").and_then(Value::as_f64),
            )
        } else {
            (None, None, None)
        };

        let text = format!("{} {}", title, snippet);
        for keyword in keywords::extract_keywords(&text, keywords_per_result) {
            keywords.push(RankedKeyword {
                keyword,
                position,
                url: url.to_string(),
                search_volume,
                cpc,
                competition,
            });
        }

        top_urls.push(RankedUrl {
            url: url.to_string(),
            title: title.to_string(),
            snippet: if snippet.is_empty() {
                None
            } else {
                Some(snippet.to_string())
            },
            position,
        });
    }

    DiscoveryResult {
        domain: domain.to_string(),
        keywords,
        top_urls,
        provider: provider.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_from_config_defaults_to_mock() {
        let config = Config::default();
        let providers = Provider::from_config(&config, Client::new());

        assert_eq!(providers.len(), 1);
        assert_eq!(providers[0].name(), "mock");
    }

    #[test]
    fn test_from_config_with_credentials() {
        let mut config = Config::default();
        config.providers.google_cse_api_key = Some("key".to_string());
        config.providers.google_cse_cx = Some("cx".to_string());
        config.providers.serpapi_key = Some("key".to_string());

        let providers = Provider::from_config(&config, Client::new());
        let names: Vec<_> = providers.iter().map(Provider::name).collect();
        assert_eq!(names, vec!["google_cse", "serpapi"]);
    }

    #[test]
    fn test_mock_provider_is_deterministic() {
        let query = DiscoveryQuery::new("widgets.example.com");
        let a = MockProvider.fetch(&query).unwrap();
        let b = MockProvider.fetch(&query).unwrap();

        assert_eq!(a.keywords.len(), b.keywords.len());
        assert_eq!(a.keywords[0].keyword, "widgets services");
        assert_eq!(a.keywords[0].keyword, b.keywords[0].keyword);
        assert_eq!(a.top_urls.len(), 5);
        assert_eq!(a.top_urls[0].url, "https://widgets.example.com/");
        assert_eq!(a.provider, "mock");
    }

    #[tokio::test]
    async fn test_google_cse_normalizes_items() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("q", "site:example.com"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [
                    {
                        "title": "Example Widgets Catalog",
                        "snippet": "Premium widgets shipped worldwide",
                        "link": "https://example.com/widgets"
                    },
                    {
                        "title": "About Example",
                        "snippet": "Company history",
                        "link": "https://example.com/about"
                    }
                ]
            })))
            .mount(&server)
            .await;

        let provider = GoogleCse::new(Client::new(), "k", "cx", &server.uri());
        let result = provider
            .fetch(&DiscoveryQuery::new("example.com"))
            .await
            .unwrap();

        assert_eq!(result.provider, "google_cse");
        assert_eq!(result.top_urls.len(), 2);
        assert_eq!(result.top_urls[0].position, 1);
        assert_eq!(result.top_urls[1].url, "https://example.com/about");

        let first = &result.keywords[0];
        assert_eq!(first.position, 1);
        assert_eq!(first.url, "https://example.com/widgets");
        assert!(first.search_volume.is_none());
        assert!(result
            .keywords
            .iter()
            .any(|k| k.keyword == "widgets" && k.position == 1));
    }

    #[tokio::test]
    async fn test_google_cse_surfaces_http_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let provider = GoogleCse::new(Client::new(), "k", "cx", &server.uri());
        let err = provider
            .fetch(&DiscoveryQuery::new("example.com"))
            .await
            .unwrap_err();

        match err {
            ScoutError::Provider { provider, message } => {
                assert_eq!(provider, "google_cse");
                assert_eq!(message, "HTTP 403");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_serpapi_carries_metrics_and_location() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("location", "Austin, Texas, United States"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "organic_results": [
                    {
                        "title": "Example Pricing Plans",
                        "snippet": "Transparent pricing tiers",
                        "link": "https://example.com/pricing",
                        "search_volume": 900,
                        "cpc": 3.5,
                        "competition": 0.42
                    }
                ]
            })))
            .mount(&server)
            .await;

        let provider = SerpApi::new(Client::new(), "k", &server.uri());
        let query = DiscoveryQuery::new("example.com")
            .with_location("Austin, Texas, United States");
        let result = provider.fetch(&query).await.unwrap();

        assert_eq!(result.provider, "serpapi");
        let first = &result.keywords[0];
        assert_eq!(first.search_volume, Some(900));
        assert_eq!(first.cpc, Some(3.5));
        assert_eq!(first.competition, Some(0.42));
    }

    #[tokio::test]
    async fn test_empty_result_array_normalizes_to_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
            .mount(&server)
            .await;

        let provider = GoogleCse::new(Client::new(), "k", "cx", &server.uri());
        let result = provider
            .fetch(&DiscoveryQuery::new("example.com"))
            .await
            .unwrap();

        assert!(result.keywords.is_empty());
        assert!(result.top_urls.is_empty());
    }

    #[test]
    fn test_normalize_skips_keyword_stop_words() {
        let items = json!([{
            "title": "The Best Widgets for the Money",
            "snippet": "",
            "link": "https://example.com/"
        }]);
        let result = normalize_results("example.com", Some(&items), 10, "google_cse", false);

        let words: Vec<_> = result.keywords.iter().map(|k| k.keyword.as_str()).collect();
        assert!(words.contains(&"best"));
        assert!(words.contains(&"widgets"));
        assert!(words.contains(&"money"));
        assert!(!words.contains(&"the"));
        assert!(!words.contains(&"for"));
    }
}
