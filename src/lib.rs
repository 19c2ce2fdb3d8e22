//! Rankscout: polite domain discovery and page harvesting
//!
//! This crate discovers which pages and keywords a domain ranks for via upstream
//! search providers, then fetches a bounded set of those pages while respecting
//! robots.txt rules, crawl delays, and a global concurrency cap.

pub mod cache;
pub mod config;
pub mod crawler;
pub mod keywords;
pub mod limiter;
pub mod robots;
pub mod serp;

use thiserror::Error;

/// Main error type for rankscout operations
#[derive(Debug, Error)]
pub enum ScoutError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Cache error: {0}")]
    Cache(#[from] cache::CacheError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Provider {provider} failed: {message}")]
    Provider { provider: String, message: String },

    #[error("All search providers failed for {domain}")]
    AllProvidersExhausted { domain: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for rankscout operations
pub type Result<T> = std::result::Result<T, ScoutError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use cache::{CacheStore, CachedResponse, MemoryCache, SqliteCache};
pub use config::Config;
pub use crawler::{CrawlContext, CrawlOrchestrator, CrawlResult, PageError, PageFetcher, ScrapedPage};
pub use limiter::DomainRateLimiter;
pub use robots::RobotsCache;
pub use serp::{DiscoveryQuery, DiscoveryResult, SerpClient};
