use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads, parses, and validates a configuration file
///
/// Provider credentials found in the environment (`GOOGLE_CSE_API_KEY`,
/// `GOOGLE_CSE_CX`, `SERPAPI_KEY`) override anything in the file, matching
/// the usual deployment where keys are injected rather than committed.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    Ok(load_config_with_hash(path)?.0)
}

/// Loads a configuration and returns it together with its content hash
///
/// The hex-encoded SHA-256 of the raw file content identifies a configuration
/// across runs; two runs with the same hash crawled under the same settings.
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let hash = content_hash(&content);

    let mut config: Config = toml::from_str(&content)?;
    apply_env_overrides(&mut config);
    validate(&config)?;

    Ok((config, hash))
}

/// Computes the configuration hash for a file without loading it
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    Ok(content_hash(&std::fs::read_to_string(path)?))
}

/// Overrides provider credentials from the process environment
pub fn apply_env_overrides(config: &mut Config) {
    if let Ok(key) = std::env::var("GOOGLE_CSE_API_KEY") {
        config.providers.google_cse_api_key = Some(key);
    }
    if let Ok(cx) = std::env::var("GOOGLE_CSE_CX") {
        config.providers.google_cse_cx = Some(cx);
    }
    if let Ok(key) = std::env::var("SERPAPI_KEY") {
        config.providers.serpapi_key = Some(key);
    }
}

fn content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}
