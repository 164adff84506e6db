// src/fetch/fetcher.rs
// =============================================================================
// Retrieves a URL's content with a bounded retry budget.
//
// How it works:
// 1. Ask the transport for the URL
// 2. If it fails with a retryable error and budget remains, sleep and retry
// 3. Otherwise hand back the body or the last error
//
// A success on the third attempt looks exactly like a success on the first.
// The Fetcher never touches crawl state, so one instance (cloned) is shared
// by the page traversal and all download workers.
// =============================================================================

use super::{Fetched, RetryPolicy, Transport};
use crate::error::FetchError;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

// A fetched HTML page together with the URL that served it
#[derive(Debug, Clone)]
pub struct Document {
    /// Final URL after redirects; relative links resolve against it
    pub url: Url,
    pub html: String,
}

#[derive(Clone)]
pub struct Fetcher {
    transport: Arc<dyn Transport>,
    retry: RetryPolicy,
}

impl Fetcher {
    pub fn new(transport: Arc<dyn Transport>, retry: RetryPolicy) -> Self {
        Self { transport, retry }
    }

    pub async fn fetch(&self, url: &Url) -> Result<Fetched, FetchError> {
        let mut attempt = 0;

        loop {
            match self.transport.get(url).await {
                Ok(fetched) => {
                    debug!(
                        url = %url,
                        final_url = %fetched.url,
                        attempt = attempt + 1,
                        bytes = fetched.body.len(),
                        "fetched"
                    );
                    return Ok(fetched);
                }
                Err(err) if err.is_retryable() && attempt < self.retry.max_retries => {
                    let delay = self.retry.delay(attempt);
                    attempt += 1;
                    warn!(
                        url = %url,
                        attempt,
                        max_retries = self.retry.max_retries,
                        error = %err,
                        "retrying in {:?}",
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    // Fetches a page as text. Invalid UTF-8 is replaced rather than rejected;
    // the link extractor copes with whatever comes out.
    pub async fn fetch_document(&self, url: &Url) -> Result<Document, FetchError> {
        let fetched = self.fetch(url).await?;
        Ok(Document {
            url: fetched.url,
            html: String::from_utf8_lossy(&fetched.body).into_owned(),
        })
    }
}

impl std::fmt::Debug for Fetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fetcher").field("retry", &self.retry).finish_non_exhaustive()
    }
}
