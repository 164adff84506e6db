// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use the "derive" API: the struct below IS the CLI. Each field becomes a
// positional argument or a --flag, and the doc comments become --help text.
//
// Defaults live in config.rs so the CLI and the config layer agree on them.
// =============================================================================

use crate::config::{
    DEFAULT_BACKOFF_MS, DEFAULT_DELAY_MS, DEFAULT_DOWNLOAD_DIR, DEFAULT_EXTENSION, DEFAULT_RETRIES,
    DEFAULT_TIMEOUT_SECS, DEFAULT_WORKERS,
};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "pdf-harvester",
    version,
    about = "Crawl a website and download every linked PDF from allowed domains",
    long_about = "pdf-harvester crawls a website breadth-first starting from one page, follows links \
                  within the allowed domains, and saves every matching file (PDF by default) under \
                  a download directory that mirrors the URL paths."
)]
pub struct Cli {
    /// Page to start crawling from (a trailing slash is added if missing)
    ///
    /// Defaults to the Black Hat USA 2025 briefings schedule
    pub start_url: Option<String>,

    /// Directory downloaded files are written under
    #[arg(long, short = 'o', default_value = DEFAULT_DOWNLOAD_DIR)]
    pub download_dir: PathBuf,

    /// Allowed domain, exact ("example.com") or wildcard ("*.example.com")
    ///
    /// Repeat the flag to allow several domains. When omitted, the built-in
    /// list (blackhat.com, *.blackhat.com) is used.
    #[arg(long = "allow-domain", value_name = "PATTERN")]
    pub allow_domains: Vec<String>,

    /// File extension to download
    #[arg(long, default_value = DEFAULT_EXTENSION)]
    pub extension: String,

    /// Number of concurrent download workers
    #[arg(long, default_value_t = DEFAULT_WORKERS)]
    pub workers: usize,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Retries for timeouts, connection errors and 429/5xx responses
    #[arg(long, default_value_t = DEFAULT_RETRIES)]
    pub retries: u32,

    /// First retry delay in milliseconds (doubles on each retry)
    #[arg(long, default_value_t = DEFAULT_BACKOFF_MS)]
    pub backoff_ms: u64,

    /// Minimum delay between two downloads, in milliseconds
    #[arg(long, default_value_t = DEFAULT_DELAY_MS)]
    pub delay_ms: u64,

    /// Maximum crawl depth (1 = only the start page). Unlimited by default
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// User-Agent header sent with every request for this run
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Do not fetch or obey robots.txt
    #[arg(long)]
    pub ignore_robots: bool,

    /// Store files under <download-dir>/<host>/<path> instead of <download-dir>/<path>
    #[arg(long)]
    pub by_host: bool,

    /// Print the final report as JSON instead of a table
    #[arg(long)]
    pub json: bool,

    /// Log debug details (retries, skipped URLs, link counts)
    #[arg(long, short = 'v')]
    pub verbose: bool,
}
