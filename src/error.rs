// src/error.rs
// =============================================================================
// Error types shared across the crawler.
//
// Every failure that concerns a single URL (a page fetch, a download) is
// recovered locally by the crawl engine: it gets logged and the URL is
// abandoned. Only CrawlError stops a run, and only before it starts.
//
// We use `thiserror` here so each failure is a real type we can match on
// (retry decisions depend on it), while main.rs keeps using anyhow like the
// rest of the binary glue.
// =============================================================================

use std::path::PathBuf;
use thiserror::Error;

// A failed HTTP GET (after the transport gave up or the server said no)
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// The request did not complete within the configured timeout
    #[error("request to {url} timed out")]
    Timeout { url: String },

    /// Connection refused, reset, DNS failure, TLS handshake failure
    #[error("could not connect to {url}: {reason}")]
    Connect { url: String, reason: String },

    /// The server answered with a non-success status
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// Headers arrived but reading the body failed midway
    #[error("failed to read body of {url}: {reason}")]
    Body { url: String, reason: String },

    /// A redirect was refused: it looped or pointed outside the allowed domains
    #[error("redirect from {url} refused: {reason}")]
    Redirect { url: String, reason: String },

    /// Anything else reqwest reports (bad URL, builder errors)
    #[error("request to {url} failed: {reason}")]
    Request { url: String, reason: String },
}

impl FetchError {
    // Whether another attempt has a reasonable chance of succeeding.
    //
    // Network-level failures and the server-side/throttling statuses are
    // retried; client errors like 404 or 403 are final.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Timeout { .. } | FetchError::Connect { .. } | FetchError::Body { .. } => true,
            FetchError::Status { status, .. } => is_retryable_status(*status),
            FetchError::Redirect { .. } | FetchError::Request { .. } => false,
        }
    }
}

// 429 Too Many Requests plus the 5xx codes that usually mean "try again"
pub fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

// A failed attempt to persist a target resource
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Permission denied, disk full, rename failure...
    #[error("filesystem error at {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The URL path cannot be mapped under the download root
    #[error("refusing to derive a file path from {url}: {reason}")]
    UnsafePath { url: String, reason: String },

    /// The crawl was stopped before this download started
    #[error("download of {url} abandoned: crawl cancelled")]
    Cancelled { url: String },
}

// Errors that prevent a crawl from starting at all
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("invalid start URL '{url}': {reason}")]
    InvalidStartUrl { url: String, reason: String },

    #[error("start URL {url} rejected: {reason}")]
    PolicyRejection { url: String, reason: String },
}
