//! Configuration for rankscout
//!
//! Loads, parses, and validates TOML configuration files. Provider credentials
//! can additionally come from environment variables, which take precedence
//! over the file.
//!
//! # Example
//!
//! ```no_run
//! use rankscout::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("rankscout.toml")).unwrap();
//! println!("Concurrency cap: {}", config.crawler.max_concurrent_fetches);
//! ```

mod parser;
mod types;
mod validation;

pub use parser::{apply_env_overrides, compute_config_hash, load_config, load_config_with_hash};
pub use types::{CacheConfig, Config, CrawlerConfig, ProviderConfig, UserAgentConfig};
