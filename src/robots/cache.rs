//! Per-domain robots.txt fetching and caching
//!
//! Policies are fetched once per domain and reused until their TTL lapses.
//! Fetching never fails from the caller's perspective: an unreachable or
//! unparseable robots.txt yields the configured failure default (permissive
//! unless fail-closed is enabled).

use crate::robots::RobotsPolicy;
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use std::collections::HashMap;
use tokio::sync::RwLock;
use url::Url;

/// A cached policy with its fetch timestamp
#[derive(Debug, Clone)]
pub struct CachedPolicy {
    /// The evaluated policy
    pub policy: RobotsPolicy,

    /// When the robots.txt was fetched
    pub fetched_at: DateTime<Utc>,
}

impl CachedPolicy {
    fn new(policy: RobotsPolicy) -> Self {
        Self {
            policy,
            fetched_at: Utc::now(),
        }
    }

    /// Whether the entry is older than the given TTL
    pub fn is_stale(&self, ttl: Duration) -> bool {
        Utc::now() - self.fetched_at > ttl
    }
}

/// Fetches, evaluates, and caches robots.txt policies per domain
pub struct RobotsCache {
    client: Client,
    policies: RwLock<HashMap<String, CachedPolicy>>,
    product_token: String,
    ttl: Duration,
    fail_closed: bool,
}

impl RobotsCache {
    /// Creates a cache using the given HTTP client and crawler identity
    ///
    /// # Arguments
    ///
    /// * `client` - Shared HTTP client (carries the user agent and timeout)
    /// * `product_token` - The crawler name matched against `User-agent` tokens
    /// * `ttl_hours` - How long a fetched policy stays fresh
    /// * `fail_closed` - Treat an unreadable robots.txt as deny-all
    pub fn new(client: Client, product_token: &str, ttl_hours: u64, fail_closed: bool) -> Self {
        Self {
            client,
            policies: RwLock::new(HashMap::new()),
            product_token: product_token.to_string(),
            ttl: Duration::hours(ttl_hours as i64),
            fail_closed,
        }
    }

    /// The product token used for agent matching
    pub fn product_token(&self) -> &str {
        &self.product_token
    }

    /// Returns the robots policy governing the given URL
    ///
    /// The policy is looked up by the URL's authority (host plus any explicit
    /// port) and fetched from `{scheme}://{authority}/robots.txt` on a miss or
    /// when the cached entry is stale. Never returns an error: fetch and parse
    /// failures resolve to the configured failure default.
    pub async fn policy_for(&self, url: &Url) -> RobotsPolicy {
        let authority = match url.host_str() {
            Some(host) => match url.port() {
                Some(port) => format!("{}:{}", host, port),
                None => host.to_string(),
            },
            None => {
                tracing::debug!("URL {} has no host; using failure default", url);
                return self.failure_default();
            }
        };

        {
            let policies = self.policies.read().await;
            if let Some(cached) = policies.get(&authority) {
                if !cached.is_stale(self.ttl) {
                    return cached.policy.clone();
                }
            }
        }

        let policy = self.fetch_policy(url, &authority).await;

        let mut policies = self.policies.write().await;
        policies.insert(authority, CachedPolicy::new(policy.clone()));
        policy
    }

    /// Convenience wrapper: may the crawler fetch this URL?
    pub async fn is_allowed(&self, url: &Url) -> bool {
        self.policy_for(url)
            .await
            .is_allowed(url.as_str(), &self.product_token)
    }

    /// Crawl delay (seconds) advertised for this crawler on the URL's domain
    pub async fn crawl_delay(&self, url: &Url) -> Option<f64> {
        self.policy_for(url).await.crawl_delay(&self.product_token)
    }

    fn failure_default(&self) -> RobotsPolicy {
        if self.fail_closed {
            RobotsPolicy::deny_all()
        } else {
            RobotsPolicy::allow_all()
        }
    }

    async fn fetch_policy(&self, url: &Url, authority: &str) -> RobotsPolicy {
        let mut robots_url = url.clone();
        robots_url.set_path("/robots.txt");
        robots_url.set_query(None);
        robots_url.set_fragment(None);

        tracing::debug!("Fetching robots.txt for {}", authority);

        let response = match self.client.get(robots_url.clone()).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Could not fetch robots.txt for {}: {}", authority, e);
                return self.failure_default();
            }
        };

        if !response.status().is_success() {
            tracing::debug!(
                "robots.txt for {} returned HTTP {}; using failure default",
                authority,
                response.status()
            );
            return self.failure_default();
        }

        match response.text().await {
            Ok(body) => RobotsPolicy::from_content(&body),
            Err(e) => {
                tracing::warn!("Could not read robots.txt body for {}: {}", authority, e);
                self.failure_default()
            }
        }
    }
}
