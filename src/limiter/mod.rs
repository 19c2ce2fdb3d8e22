//! Per-domain request spacing
//!
//! Enforces a minimum interval between requests to the same domain. Each
//! domain has its own async lock and last-grant timestamp; the timestamp is
//! written at the moment the turn is granted, while the lock is still held, so
//! concurrent callers targeting one domain serialize without drift. Requests
//! to different domains never wait on each other.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Mutex as AsyncMutex;
use tokio::time::Instant;

#[derive(Debug, Default)]
struct DomainClock {
    last_granted: Option<Instant>,
}

/// Enforces minimum inter-request spacing per domain
pub struct DomainRateLimiter {
    domains: Mutex<HashMap<String, Arc<AsyncMutex<DomainClock>>>>,
    default_delay: Duration,
}

impl DomainRateLimiter {
    /// Creates a limiter with a default spacing of `1 / requests_per_second`
    ///
    /// The default applies whenever a domain advertises no crawl-delay.
    pub fn new(requests_per_second: f64) -> Self {
        Self {
            domains: Mutex::new(HashMap::new()),
            default_delay: Duration::from_secs_f64(1.0 / requests_per_second),
        }
    }

    /// The spacing applied for a domain given its advertised crawl-delay
    pub fn effective_delay(&self, crawl_delay: Option<f64>) -> Duration {
        match crawl_delay {
            Some(seconds) if seconds > 0.0 => Duration::from_secs_f64(seconds),
            _ => self.default_delay,
        }
    }

    /// Waits until a request to the domain is permitted, then records the grant
    ///
    /// Suspends the caller for however much of the effective delay remains
    /// since the previous grant to the same domain. Holding the per-domain
    /// lock across the sleep is what serializes same-domain callers.
    pub async fn wait_turn(&self, domain: &str, crawl_delay: Option<f64>) {
        let clock = {
            let mut domains = self.domains.lock().unwrap();
            domains
                .entry(domain.to_string())
                .or_insert_with(|| Arc::new(AsyncMutex::new(DomainClock::default())))
                .clone()
        };

        let mut clock = clock.lock().await;
        let delay = self.effective_delay(crawl_delay);

        if let Some(last) = clock.last_granted {
            let elapsed = Instant::now().duration_since(last);
            if elapsed < delay {
                let remaining = delay - elapsed;
                tracing::trace!("Rate limit: waiting {:?} for {}", remaining, domain);
                tokio::time::sleep(remaining).await;
            }
        }

        clock.last_granted = Some(Instant::now());
    }

    /// Number of domains with recorded request history
    pub fn domains_tracked(&self) -> usize {
        self.domains.lock().unwrap().len()
    }
}
