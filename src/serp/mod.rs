//! SERP discovery client
//!
//! Queries upstream search providers for the pages and keywords a domain
//! ranks for, normalizes their responses into one shape, and caches payloads
//! under a TTL. Providers are tried in fixed priority order; the first one
//! returning a non-empty keyword list wins.

mod provider;

pub use provider::{GoogleCse, MockProvider, Provider, SerpApi};

use crate::cache::{self, CacheStore, CachedResponse};
use crate::{Result, ScoutError};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Parameters identifying one discovery request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryQuery {
    /// The domain to discover rankings for
    pub domain: String,

    /// Two-letter country code (default "US")
    pub country: String,

    /// Two-letter language code (default "en")
    pub language: String,

    /// Optional location hint, e.g. "Austin, Texas, United States"
    pub location: Option<String>,
}

impl DiscoveryQuery {
    /// Builds a query with default locale settings
    pub fn new(domain: &str) -> Self {
        Self {
            domain: domain.to_string(),
            country: "US".to_string(),
            language: "en".to_string(),
            location: None,
        }
    }

    /// Sets the country code
    pub fn with_country(mut self, country: &str) -> Self {
        self.country = country.to_string();
        self
    }

    /// Sets the language code
    pub fn with_language(mut self, language: &str) -> Self {
        self.language = language.to_string();
        self
    }

    /// Sets the location hint
    pub fn with_location(mut self, location: &str) -> Self {
        self.location = Some(location.to_string());
        self
    }

    /// Deterministic cache key over all four parameters
    pub fn cache_key(&self) -> String {
        cache::cache_key(
            "domain_keywords",
            &[
                &self.domain,
                &self.country,
                &self.language,
                self.location.as_deref().unwrap_or(""),
            ],
        )
    }
}

/// One keyword a domain ranks for
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedKeyword {
    pub keyword: String,

    /// Rank of the result the keyword was derived from (1-based)
    pub position: u32,

    /// The ranking URL
    pub url: String,

    /// Monthly search volume, when the provider reports it
    pub search_volume: Option<u64>,

    /// Cost-per-click estimate, when the provider reports it
    pub cpc: Option<f64>,

    /// Competition score, when the provider reports it
    pub competition: Option<f64>,
}

/// One ranking page for the domain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedUrl {
    pub url: String,
    pub title: String,
    pub snippet: Option<String>,

    /// Rank in the result list (1-based)
    pub position: u32,
}

/// Normalized discovery outcome, identical across providers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryResult {
    pub domain: String,
    pub keywords: Vec<RankedKeyword>,
    pub top_urls: Vec<RankedUrl>,

    /// Name of the provider that produced this result
    pub provider: String,
}

impl DiscoveryResult {
    /// A result with no keywords and no URLs, tagged with a provider name
    pub fn empty(domain: &str, provider: &str) -> Self {
        Self {
            domain: domain.to_string(),
            keywords: Vec::new(),
            top_urls: Vec::new(),
            provider: provider.to_string(),
        }
    }

    /// The ranked page URLs in order, for feeding into a crawl
    pub fn candidate_urls(&self) -> Vec<String> {
        self.top_urls.iter().map(|u| u.url.clone()).collect()
    }
}

/// Cache-backed, multi-provider discovery client
pub struct SerpClient {
    providers: Vec<Provider>,
    cache: Arc<dyn CacheStore>,
    ttl: Duration,
}

impl SerpClient {
    /// Creates a client with providers derived from configuration
    ///
    /// Which providers are enabled follows from which credentials are present;
    /// with none at all, the deterministic mock provider stands in.
    pub fn new(
        config: &crate::config::Config,
        client: reqwest::Client,
        cache: Arc<dyn CacheStore>,
    ) -> Self {
        Self {
            providers: Provider::from_config(config, client),
            cache,
            ttl: Duration::hours(config.cache.ttl_hours as i64),
        }
    }

    /// Creates a client over an explicit provider chain
    pub fn with_providers(
        providers: Vec<Provider>,
        cache: Arc<dyn CacheStore>,
        ttl: Duration,
    ) -> Self {
        Self {
            providers,
            cache,
            ttl,
        }
    }

    /// Names of the enabled providers, in priority order
    pub fn provider_names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Discovers keywords and ranking pages for a domain
    ///
    /// A non-expired cache entry is returned verbatim with no network call.
    /// Otherwise each provider gets exactly one attempt, in priority order:
    /// the first non-empty result is cached and returned; a provider error
    /// falls through to the next. When every provider returns empty without
    /// erroring, the last empty result is a valid outcome and is returned
    /// as-is (but not cached - a later call may do better). Only when every
    /// tried provider fails does the call surface an error.
    pub async fn discover(&self, query: &DiscoveryQuery) -> Result<DiscoveryResult> {
        let key = query.cache_key();

        match self.cache.get(&key) {
            Ok(Some(entry)) => match serde_json::from_value::<DiscoveryResult>(entry.payload) {
                Ok(result) => {
                    tracing::info!(
                        "Using cached discovery data for {} [{}/{}] (provider {})",
                        query.domain,
                        query.country,
                        query.language,
                        entry.provider
                    );
                    return Ok(result);
                }
                Err(e) => {
                    tracing::warn!(
                        "Discarding undecodable cache entry for {}: {}",
                        query.domain,
                        e
                    );
                }
            },
            Ok(None) => {}
            Err(e) => {
                tracing::warn!("Cache read failed for {}: {}", query.domain, e);
            }
        }

        let mut last_empty: Option<DiscoveryResult> = None;

        for provider in &self.providers {
            tracing::info!(
                "Fetching discovery data for {} using {} [{}/{}]",
                query.domain,
                provider.name(),
                query.country,
                query.language
            );

            match provider.fetch(query).await {
                Ok(result) if !result.keywords.is_empty() => {
                    self.store(&key, provider.name(), &result);
                    return Ok(result);
                }
                Ok(result) => {
                    tracing::warn!(
                        "Provider {} returned no keywords for {}",
                        provider.name(),
                        query.domain
                    );
                    last_empty = Some(result);
                }
                Err(e) => {
                    tracing::error!(
                        "Provider {} failed for {}: {}",
                        provider.name(),
                        query.domain,
                        e
                    );
                }
            }
        }

        if let Some(result) = last_empty {
            return Ok(result);
        }

        Err(ScoutError::AllProvidersExhausted {
            domain: query.domain.clone(),
        })
    }

    fn store(&self, key: &str, provider: &str, result: &DiscoveryResult) {
        let payload = match serde_json::to_value(result) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!("Could not serialize discovery result for caching: {}", e);
                return;
            }
        };

        let entry = CachedResponse::new(key, provider, payload, self.ttl);
        if let Err(e) = self.cache.put(entry) {
            tracing::warn!("Failed to cache discovery response: {}", e);
        }
    }
}
