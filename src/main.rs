//! Rankscout command-line interface
//!
//! Three modes: discover the pages/keywords a domain ranks for, crawl an
//! explicit URL list for a domain, or run the full analyze pipeline
//! (discover, then crawl the ranking pages). Results print as JSON.

use anyhow::Context;
use clap::{Parser, Subcommand};
use rankscout::cache::{CacheStore, MemoryCache, SqliteCache};
use rankscout::config::{load_config_with_hash, Config};
use rankscout::crawler::{CrawlContext, CrawlOrchestrator};
use rankscout::serp::{DiscoveryQuery, SerpClient};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Rankscout: polite domain discovery and page harvesting
#[derive(Parser, Debug)]
#[command(name = "rankscout")]
#[command(version)]
#[command(about = "Discover what a domain ranks for and politely harvest those pages", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply if absent)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Query search providers for a domain's keywords and ranking pages
    Discover {
        /// Domain to discover, e.g. example.com
        domain: String,

        /// Two-letter country code
        #[arg(long, default_value = "US")]
        country: String,

        /// Two-letter language code
        #[arg(long, default_value = "en")]
        language: String,

        /// Location hint, e.g. "Austin, Texas, United States"
        #[arg(long)]
        location: Option<String>,
    },

    /// Crawl an explicit list of URLs for a domain
    Crawl {
        /// Domain the URLs belong to
        domain: String,

        /// Candidate URLs in priority order
        #[arg(required = true)]
        urls: Vec<String>,

        /// Cap on pages fetched (defaults to max-pages-per-domain)
        #[arg(long)]
        max_pages: Option<usize>,
    },

    /// Discover a domain, then crawl its top ranking pages
    Analyze {
        /// Domain to analyze
        domain: String,

        /// Two-letter country code
        #[arg(long, default_value = "US")]
        country: String,

        /// Two-letter language code
        #[arg(long, default_value = "en")]
        language: String,

        /// Location hint
        #[arg(long)]
        location: Option<String>,

        /// Cap on pages fetched (defaults to max-pages-per-domain)
        #[arg(long)]
        max_pages: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    let config = load_configuration(cli.config.as_deref())?;
    let cache = build_cache_store(&config)?;

    let context = CrawlContext::new(&config).context("Failed to build HTTP client")?;
    let serp = SerpClient::new(&config, context.client.clone(), cache);
    let orchestrator = CrawlOrchestrator::new(&context);

    match cli.command {
        Command::Discover {
            domain,
            country,
            language,
            location,
        } => {
            let query = build_query(&domain, &country, &language, location.as_deref());
            let result = serp.discover(&query).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }

        Command::Crawl {
            domain,
            urls,
            max_pages,
        } => {
            let cap = max_pages.unwrap_or_else(|| orchestrator.default_max_pages());
            let result = orchestrator.crawl(&domain, &urls, cap).await;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }

        Command::Analyze {
            domain,
            country,
            language,
            location,
            max_pages,
        } => {
            let query = build_query(&domain, &country, &language, location.as_deref());
            let discovery = serp.discover(&query).await?;
            tracing::info!(
                "Discovery for {} via {}: {} keyword(s), {} ranking page(s)",
                domain,
                discovery.provider,
                discovery.keywords.len(),
                discovery.top_urls.len()
            );

            let cap = max_pages.unwrap_or_else(|| orchestrator.default_max_pages());
            let crawl = orchestrator
                .crawl(&domain, &discovery.candidate_urls(), cap)
                .await;

            let report = serde_json::json!({
                "discovery": discovery,
                "crawl": crawl,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

/// Sets up the tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("rankscout=info,warn"),
            1 => EnvFilter::new("rankscout=debug,info"),
            2 => EnvFilter::new("rankscout=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads configuration from the given path, or defaults when none is given
fn load_configuration(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => {
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            tracing::info!(
                "Configuration loaded from {} (hash: {})",
                path.display(),
                hash
            );
            Ok(config)
        }
        None => {
            tracing::info!("No configuration file given; using defaults");
            let mut config = Config::default();
            rankscout::config::apply_env_overrides(&mut config);
            Ok(config)
        }
    }
}

/// Builds the response cache backend selected by configuration
fn build_cache_store(config: &Config) -> anyhow::Result<Arc<dyn CacheStore>> {
    match &config.cache.sqlite_path {
        Some(path) => {
            tracing::info!("Using SQLite response cache at {}", path);
            let cache = SqliteCache::open(Path::new(path))
                .with_context(|| format!("Failed to open cache database {}", path))?;
            Ok(Arc::new(cache))
        }
        None => {
            tracing::debug!("Using in-memory response cache");
            Ok(Arc::new(MemoryCache::new()))
        }
    }
}

fn build_query(
    domain: &str,
    country: &str,
    language: &str,
    location: Option<&str>,
) -> DiscoveryQuery {
    let mut query = DiscoveryQuery::new(domain)
        .with_country(country)
        .with_language(language);
    if let Some(location) = location {
        query = query.with_location(location);
    }
    query
}
