//! Robots.txt policy evaluation
//!
//! Allow/disallow matching is delegated to the robotstxt crate; crawl-delay is
//! parsed by hand because the crate does not expose it.

use robotstxt::DefaultMatcher;

/// Evaluated robots.txt rules for one domain
///
/// A policy is either backed by fetched robots.txt content or is one of the two
/// synthetic defaults used when the file cannot be retrieved: permissive
/// (fail-open) or blocking (fail-closed).
#[derive(Debug, Clone)]
pub struct RobotsPolicy {
    /// Raw robots.txt content; empty for synthetic policies
    content: String,

    /// Verdict used when there is no content to evaluate
    default_allow: bool,
}

impl RobotsPolicy {
    /// Builds a policy from fetched robots.txt content
    pub fn from_content(content: &str) -> Self {
        Self {
            content: content.to_string(),
            default_allow: true,
        }
    }

    /// Synthetic policy permitting every path (fail-open default)
    pub fn allow_all() -> Self {
        Self {
            content: String::new(),
            default_allow: true,
        }
    }

    /// Synthetic policy blocking every path (fail-closed alternative)
    pub fn deny_all() -> Self {
        Self {
            content: String::new(),
            default_allow: false,
        }
    }

    /// Checks whether a URL may be fetched by the given agent
    ///
    /// Pure and non-panicking; an empty or synthetic policy falls back to its
    /// default verdict.
    pub fn is_allowed(&self, url: &str, user_agent: &str) -> bool {
        if self.content.is_empty() {
            return self.default_allow;
        }

        let mut matcher = DefaultMatcher::default();
        matcher.one_agent_allowed_by_robots(&self.content, user_agent, url)
    }

    /// Extracts the crawl delay in seconds for the given product token
    ///
    /// The delay is taken from any group whose `User-agent` token is `*` or a
    /// case-insensitive substring of the product token. A group-specific match
    /// wins over the wildcard.
    pub fn crawl_delay(&self, product_token: &str) -> Option<f64> {
        if self.content.is_empty() {
            return None;
        }

        let token = product_token.to_lowercase();
        let mut group_agents: Vec<String> = Vec::new();
        let mut in_group_header = true;
        let mut wildcard_delay: Option<f64> = None;
        let mut agent_delay: Option<f64> = None;

        for line in self.content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let key = key.trim().to_lowercase();
            let value = value.trim();

            match key.as_str() {
                "user-agent" => {
                    // Consecutive User-agent lines share one group; a directive
                    // in between starts a fresh group on the next agent line.
                    if !in_group_header {
                        group_agents.clear();
                        in_group_header = true;
                    }
                    group_agents.push(value.to_lowercase());
                }
                "crawl-delay" => {
                    in_group_header = false;
                    let Ok(delay) = value.parse::<f64>() else {
                        continue;
                    };
                    if group_agents.iter().any(|a| a != "*" && token.contains(a.as_str())) {
                        agent_delay = Some(delay);
                    } else if group_agents.iter().any(|a| a == "*") {
                        wildcard_delay = Some(delay);
                    }
                }
                _ => {
                    in_group_header = false;
                }
            }
        }

        agent_delay.or(wildcard_delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allow_all_permits_everything() {
        let policy = RobotsPolicy::allow_all();
        assert!(policy.is_allowed("https://example.com/", "scoutbot"));
        assert!(policy.is_allowed("https://example.com/admin", "scoutbot"));
    }

    #[test]
    fn test_deny_all_blocks_everything() {
        let policy = RobotsPolicy::deny_all();
        assert!(!policy.is_allowed("https://example.com/", "scoutbot"));
        assert!(!policy.is_allowed("https://example.com/public", "scoutbot"));
    }

    #[test]
    fn test_disallow_path() {
        let policy = RobotsPolicy::from_content("User-agent: *\nDisallow: /private");
        assert!(policy.is_allowed("https://example.com/page", "scoutbot"));
        assert!(!policy.is_allowed("https://example.com/private", "scoutbot"));
        assert!(!policy.is_allowed("https://example.com/private/data", "scoutbot"));
    }

    #[test]
    fn test_more_specific_allow_overrides_disallow() {
        let policy =
            RobotsPolicy::from_content("User-agent: *\nDisallow: /private\nAllow: /private/public");
        assert!(!policy.is_allowed("https://example.com/private", "scoutbot"));
        assert!(policy.is_allowed("https://example.com/private/public", "scoutbot"));
    }

    #[test]
    fn test_agent_specific_block() {
        let content = "User-agent: badbot\nDisallow: /\n\nUser-agent: *\nAllow: /";
        let policy = RobotsPolicy::from_content(content);
        assert!(policy.is_allowed("https://example.com/page", "scoutbot"));
        assert!(!policy.is_allowed("https://example.com/page", "badbot"));
    }

    #[test]
    fn test_garbage_content_defaults_to_allow() {
        let policy = RobotsPolicy::from_content("not a robots file {{{");
        assert!(policy.is_allowed("https://example.com/anything", "scoutbot"));
    }

    #[test]
    fn test_crawl_delay_wildcard() {
        let policy = RobotsPolicy::from_content("User-agent: *\nCrawl-delay: 10");
        assert_eq!(policy.crawl_delay("scoutbot"), Some(10.0));
    }

    #[test]
    fn test_crawl_delay_fractional() {
        let policy = RobotsPolicy::from_content("User-agent: *\nCrawl-delay: 2.5");
        assert_eq!(policy.crawl_delay("scoutbot"), Some(2.5));
    }

    #[test]
    fn test_crawl_delay_agent_match_beats_wildcard() {
        let content = "User-agent: scoutbot\nCrawl-delay: 5\n\nUser-agent: *\nCrawl-delay: 10";
        let policy = RobotsPolicy::from_content(content);
        assert_eq!(policy.crawl_delay("scoutbot"), Some(5.0));
        assert_eq!(policy.crawl_delay("otherbot"), Some(10.0));
    }

    #[test]
    fn test_crawl_delay_substring_token_match() {
        // "rankscout" matches the product token "rankscout/1.0" case-insensitively
        let content = "User-agent: RankScout\nCrawl-delay: 4";
        let policy = RobotsPolicy::from_content(content);
        assert_eq!(policy.crawl_delay("rankscout/1.0"), Some(4.0));
        assert_eq!(policy.crawl_delay("otherbot"), None);
    }

    #[test]
    fn test_crawl_delay_shared_group() {
        let content = "User-agent: bota\nUser-agent: botb\nCrawl-delay: 3";
        let policy = RobotsPolicy::from_content(content);
        assert_eq!(policy.crawl_delay("bota"), Some(3.0));
        assert_eq!(policy.crawl_delay("botb"), Some(3.0));
        assert_eq!(policy.crawl_delay("botc"), None);
    }

    #[test]
    fn test_crawl_delay_new_group_resets_agents() {
        let content = "User-agent: bota\nDisallow: /x\n\nUser-agent: botb\nCrawl-delay: 7";
        let policy = RobotsPolicy::from_content(content);
        assert_eq!(policy.crawl_delay("bota"), None);
        assert_eq!(policy.crawl_delay("botb"), Some(7.0));
    }

    #[test]
    fn test_crawl_delay_unparseable_value_ignored() {
        let policy = RobotsPolicy::from_content("User-agent: *\nCrawl-delay: soon");
        assert_eq!(policy.crawl_delay("scoutbot"), None);
    }

    #[test]
    fn test_no_crawl_delay() {
        let policy = RobotsPolicy::from_content("User-agent: *\nDisallow: /admin");
        assert_eq!(policy.crawl_delay("scoutbot"), None);
    }
}
