//! Robots.txt handling
//!
//! Fetching, evaluation, and per-domain caching of robots.txt policies,
//! including crawl-delay extraction. Policy lookups are fail-open by default:
//! when robots.txt cannot be retrieved the crawler proceeds, trading strict
//! compliance for availability. A configuration flag flips this to fail-closed.

mod cache;
mod parser;

pub use cache::{CachedPolicy, RobotsCache};
pub use parser::RobotsPolicy;
