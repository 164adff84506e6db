// src/config.rs
// =============================================================================
// Crawl configuration: built-in defaults plus validation of CLI input.
//
// Everything here is decided once, before the crawl starts, and never changes
// during the run. That includes the User-Agent: one value per invocation.
// =============================================================================

use crate::cli::Cli;
use crate::download::PathLayout;
use crate::error::CrawlError;
use crate::fetch::RetryPolicy;
use crate::policy::DomainPolicy;
use anyhow::{anyhow, bail, Result};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

pub const DEFAULT_START_URL: &str = "https://www.blackhat.com/us-25/briefings/schedule/";
pub const DEFAULT_ALLOWED_DOMAINS: &[&str] = &["blackhat.com", "*.blackhat.com"];
pub const DEFAULT_DOWNLOAD_DIR: &str = "downloaded_pdfs";
pub const DEFAULT_EXTENSION: &str = "pdf";
pub const DEFAULT_WORKERS: usize = 5;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_RETRIES: u32 = 5;
pub const DEFAULT_BACKOFF_MS: u64 = 1000;
pub const DEFAULT_DELAY_MS: u64 = 1000;

pub fn default_user_agent() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub start_url: Url,
    pub download_dir: PathBuf,
    pub domains: DomainPolicy,
    pub extension: String,
    pub workers: usize,
    pub timeout: Duration,
    pub retry: RetryPolicy,
    pub download_delay: Duration,
    pub max_depth: Option<usize>,
    pub user_agent: String,
    pub respect_robots: bool,
    pub layout: PathLayout,
}

impl CrawlConfig {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let raw_start = cli.start_url.as_deref().unwrap_or(DEFAULT_START_URL).trim();
        let start_url = normalize_start_url(raw_start)?;

        let domains = if cli.allow_domains.is_empty() {
            DomainPolicy::from_patterns(DEFAULT_ALLOWED_DOMAINS)
        } else {
            DomainPolicy::from_patterns(cli.allow_domains.as_slice())
        }
        .map_err(|e| anyhow!(e))?;

        // Nothing to crawl; reject before any network or filesystem work
        if !domains.is_allowed(raw_start) {
            return Err(CrawlError::PolicyRejection {
                url: start_url.to_string(),
                reason: "host is not in the allowed domains".to_string(),
            }
            .into());
        }

        if cli.workers == 0 {
            bail!("--workers must be at least 1");
        }
        if cli.timeout_secs == 0 {
            bail!("--timeout-secs must be at least 1");
        }
        if cli.max_depth == Some(0) {
            bail!("--max-depth must be at least 1");
        }
        let extension = cli.extension.trim().trim_start_matches('.');
        if extension.is_empty() {
            bail!("--extension must not be empty");
        }

        let user_agent = match cli.user_agent.as_deref().map(str::trim) {
            Some(ua) if !ua.is_empty() => ua.to_string(),
            _ => default_user_agent(),
        };

        Ok(Self {
            start_url,
            download_dir: cli.download_dir.clone(),
            domains,
            extension: extension.to_string(),
            workers: cli.workers,
            timeout: Duration::from_secs(cli.timeout_secs),
            retry: RetryPolicy::new(cli.retries, Duration::from_millis(cli.backoff_ms)),
            download_delay: Duration::from_millis(cli.delay_ms),
            max_depth: cli.max_depth,
            user_agent,
            respect_robots: !cli.ignore_robots,
            layout: if cli.by_host { PathLayout::ByHost } else { PathLayout::Flat },
        })
    }
}

// Parses the start URL and appends a trailing slash when missing
//
// Examples:
//   "https://x.test/schedule"  -> "https://x.test/schedule/"
//   "https://x.test"           -> "https://x.test/"
pub fn normalize_start_url(raw: &str) -> Result<Url, CrawlError> {
    let raw = raw.trim();
    let with_slash = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{}/", raw)
    };

    let url = Url::parse(&with_slash).map_err(|e| CrawlError::InvalidStartUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(CrawlError::InvalidStartUrl {
            url: raw.to_string(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }
    Ok(url)
}
