// src/test_support.rs
// =============================================================================
// In-memory stand-in for the network, used by unit tests across the crate.
//
// Each URL maps to a list of canned responses. Call n gets response n; once
// the list runs out, the last response repeats. Unknown URLs answer 404.
// Every call is counted so tests can assert "fetched exactly once".
//
// A URL can also redirect to another one. Redirects are followed without any
// scope check (like a permissive HTTP client) and every hop counts as a hit.
// =============================================================================

use crate::error::FetchError;
use crate::fetch::{Fetched, Transport};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use url::Url;

type Response = Result<Vec<u8>, FetchError>;

#[derive(Default)]
pub struct FakeTransport {
    responses: HashMap<String, Vec<Response>>,
    redirects: HashMap<String, String>,
    hits: Mutex<HashMap<String, usize>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(self, url: &str, html: &str) -> Self {
        self.sequence(url, vec![Ok(html.as_bytes().to_vec())])
    }

    pub fn file(self, url: &str, bytes: &[u8]) -> Self {
        self.sequence(url, vec![Ok(bytes.to_vec())])
    }

    pub fn status(self, url: &str, status: u16) -> Self {
        let err = FetchError::Status { url: url.to_string(), status };
        self.sequence(url, vec![Err(err)])
    }

    pub fn sequence(mut self, url: &str, responses: Vec<Response>) -> Self {
        assert!(!responses.is_empty(), "a URL needs at least one response");
        self.responses.insert(url.to_string(), responses);
        self
    }

    pub fn redirect(mut self, from: &str, to: &str) -> Self {
        self.redirects.insert(from.to_string(), to.to_string());
        self
    }

    pub fn hits(&self, url: &str) -> usize {
        self.hits.lock().unwrap().get(url).copied().unwrap_or(0)
    }

    pub fn total_hits(&self) -> usize {
        self.hits.lock().unwrap().values().sum()
    }

    fn count_hit(&self, key: &str) -> usize {
        let mut hits = self.hits.lock().unwrap();
        let count = hits.entry(key.to_string()).or_insert(0);
        *count += 1;
        *count - 1
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn get(&self, url: &Url) -> Result<Fetched, FetchError> {
        let mut current = url.clone();
        let mut call = self.count_hit(current.as_str());

        for _ in 0..10 {
            let Some(target) = self.redirects.get(current.as_str()) else {
                break;
            };
            current = Url::parse(target).unwrap();
            call = self.count_hit(current.as_str());
        }

        let key = current.to_string();
        match self.responses.get(&key) {
            Some(responses) => responses[call.min(responses.len() - 1)]
                .clone()
                .map(|body| Fetched { url: current, body }),
            None => Err(FetchError::Status { url: key, status: 404 }),
        }
    }
}
