// src/policy/robots.rs
// =============================================================================
// robots.txt enforcement, as an explicit switch.
//
// When enabled, the first URL we see for an origin triggers a fetch of
// <origin>/robots.txt; the body is cached for the rest of the run and every
// URL on that origin is checked against it with Google's matching rules
// (the `robotstxt` crate).
//
// When robots.txt cannot be fetched (404, timeout, ...), the origin is
// treated as allowing everything.
//
// When disabled, every URL is allowed and no robots.txt is ever requested.
// =============================================================================

use crate::fetch::Fetcher;
use robotstxt::DefaultMatcher;
use std::collections::HashMap;
use tracing::{debug, info};
use url::Url;

pub struct RobotsGate {
    enabled: bool,
    /// Product token matched against "User-agent:" lines
    agent: String,
    fetcher: Fetcher,
    /// origin -> robots.txt body (None = unavailable, allow all)
    cache: HashMap<String, Option<String>>,
}

impl RobotsGate {
    pub fn new(enabled: bool, user_agent: &str, fetcher: Fetcher) -> Self {
        Self {
            enabled,
            agent: product_token(user_agent),
            fetcher,
            cache: HashMap::new(),
        }
    }

    pub async fn is_allowed(&mut self, url: &Url) -> bool {
        if !self.enabled {
            return true;
        }

        let origin = url.origin().ascii_serialization();
        if !self.cache.contains_key(&origin) {
            let body = self.load(url).await;
            self.cache.insert(origin.clone(), body);
        }

        match self.cache.get(&origin) {
            Some(Some(body)) => {
                let mut matcher = DefaultMatcher::default();
                let allowed = matcher.one_agent_allowed_by_robots(body, &self.agent, url.as_str());
                if !allowed {
                    debug!(url = %url, "disallowed by robots.txt");
                }
                allowed
            }
            _ => true,
        }
    }

    async fn load(&self, url: &Url) -> Option<String> {
        let robots_url = url.join("/robots.txt").ok()?;
        match self.fetcher.fetch(&robots_url).await {
            Ok(fetched) => {
                info!(url = %robots_url, "loaded robots.txt");
                Some(String::from_utf8_lossy(&fetched.body).into_owned())
            }
            Err(e) => {
                info!(url = %robots_url, error = %e, "robots.txt unavailable, allowing all");
                None
            }
        }
    }
}

// "pdf-harvester/0.1.0 (+https://...)" -> "pdf-harvester"
fn product_token(user_agent: &str) -> String {
    user_agent
        .split(|c: char| c == '/' || c.is_whitespace())
        .next()
        .filter(|token| !token.is_empty())
        .unwrap_or("*")
        .to_string()
}
