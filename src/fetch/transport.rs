// src/fetch/transport.rs
// =============================================================================
// One HTTP GET, nothing more.
//
// The Transport trait is the seam between the crawler and the network:
// - HttpTransport is the real thing, backed by a reqwest Client
// - tests plug in an in-memory fake (see src/test_support.rs)
//
// Retrying is NOT done here; the Fetcher wraps a transport with the retry
// budget. A transport only reports what happened on a single attempt.
//
// The reqwest Client is our "session": it is built once per crawl run with a
// fixed user-agent, timeout and header set, and then shared by every page
// fetch and every download worker. Cloning a Client is cheap (it is an Arc
// around a connection pool), so no global is needed.
//
// Redirects are followed only while they stay inside the allowed domains.
// A hop to any other host fails the request before that host is contacted.
// =============================================================================

use crate::error::FetchError;
use crate::policy::DomainPolicy;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::redirect;
use reqwest::Client;
use std::time::Duration;
use url::Url;

const MAX_REDIRECTS: usize = 10;

// A 2xx response body and the URL that actually served it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fetched {
    /// Differs from the requested URL when redirects were followed
    pub url: Url,
    pub body: Vec<u8>,
}

// The network capability the rest of the crate depends on
#[async_trait]
pub trait Transport: Send + Sync {
    // Performs a single GET and returns the full body on a 2xx response
    async fn get(&self, url: &Url) -> Result<Fetched, FetchError>;
}

// Settings that stay fixed for the whole crawl run
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub user_agent: String,
    pub timeout: Duration,
    /// Hosts a redirect may lead to
    pub scope: DomainPolicy,
}

// reqwest-backed transport
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(session: &SessionConfig) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/pdf;q=0.9,*/*;q=0.8"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));

        let client = Client::builder()
            .user_agent(session.user_agent.clone())
            .default_headers(headers)
            .timeout(session.timeout)
            .connect_timeout(session.timeout)
            .redirect(scoped_redirects(session.scope.clone()))
            .build()?;

        Ok(Self { client })
    }
}

// Like redirect::Policy::limited, but refuses hops outside `scope`
fn scoped_redirects(scope: DomainPolicy) -> redirect::Policy {
    redirect::Policy::custom(move |attempt| {
        if attempt.previous().len() > MAX_REDIRECTS {
            attempt.error("too many redirects")
        } else if !scope.is_allowed_url(attempt.url()) {
            let reason = format!("redirect to {} leaves the allowed domains", attempt.url());
            attempt.error(reason)
        } else {
            attempt.follow()
        }
    })
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &Url) -> Result<Fetched, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| categorize_error(url, e))?;

        let status = response.status();
        let final_url = response.url().clone();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        // Hold the whole body in memory before anyone writes it to disk
        let body = response.bytes().await.map_err(|e| categorize_error(url, e))?;
        Ok(Fetched {
            url: final_url,
            body: body.to_vec(),
        })
    }
}

// Maps a reqwest error onto our taxonomy
//
// reqwest errors can happen for many reasons:
// - timeout (connect or read)
// - connection refused / DNS failure / TLS failure
// - body interrupted
// - a redirect our policy refused (loop, or off the allowed domains)
// - invalid URL, etc.
fn categorize_error(url: &Url, error: reqwest::Error) -> FetchError {
    let url = url.to_string();

    if error.is_redirect() {
        FetchError::Redirect {
            url,
            reason: error.to_string(),
        }
    } else if error.is_timeout() {
        FetchError::Timeout { url }
    } else if error.is_connect() {
        FetchError::Connect {
            url,
            reason: error.to_string(),
        }
    } else if error.is_body() || error.is_decode() {
        FetchError::Body {
            url,
            reason: error.to_string(),
        }
    } else {
        FetchError::Request {
            url,
            reason: error.to_string(),
        }
    }
}
