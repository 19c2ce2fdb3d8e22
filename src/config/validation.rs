use crate::config::types::Config;
use crate::ConfigError;

/// Validates a parsed configuration
///
/// Checks value ranges and the internal consistency of provider credentials.
/// Returns the first problem found.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    let crawler = &config.crawler;

    if crawler.max_concurrent_fetches == 0 {
        return Err(ConfigError::Validation(
            "max-concurrent-fetches must be at least 1".to_string(),
        ));
    }

    if crawler.max_pages_per_domain == 0 {
        return Err(ConfigError::Validation(
            "max-pages-per-domain must be at least 1".to_string(),
        ));
    }

    if !crawler.requests_per_second.is_finite() || crawler.requests_per_second <= 0.0 {
        return Err(ConfigError::Validation(
            "requests-per-second must be a positive number".to_string(),
        ));
    }

    if crawler.request_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "request-timeout-secs must be at least 1".to_string(),
        ));
    }

    if crawler.max_content_length == 0 {
        return Err(ConfigError::Validation(
            "max-content-length must be at least 1".to_string(),
        ));
    }

    let ua = &config.user_agent;
    if ua.crawler_name.trim().is_empty() {
        return Err(ConfigError::Validation(
            "crawler-name must not be empty".to_string(),
        ));
    }

    if !ua.contact_url.starts_with("http://") && !ua.contact_url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "contact-url must be an http(s) URL, got: {}",
            ua.contact_url
        )));
    }

    if !ua.contact_email.contains('@') {
        return Err(ConfigError::Validation(format!(
            "contact-email does not look like an email address: {}",
            ua.contact_email
        )));
    }

    // CSE needs both halves of its credential pair
    let providers = &config.providers;
    if providers.google_cse_api_key.is_some() != providers.google_cse_cx.is_some() {
        return Err(ConfigError::Validation(
            "google-cse-api-key and google-cse-cx must be configured together".to_string(),
        ));
    }

    if config.cache.ttl_hours == 0 {
        return Err(ConfigError::Validation(
            "cache ttl-hours must be at least 1".to_string(),
        ));
    }

    Ok(())
}
