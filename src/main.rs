// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Turn them into a validated crawl configuration
// 3. Build the crawl engine (HTTP session, policies, downloader, throttle)
// 4. Run the crawl until the frontier drains or Ctrl-C is pressed
// 5. Print the report and exit with the proper code
//    (0 = crawl finished, 1 = start URL rejected, 2 = other error)
// =============================================================================

mod cli;
mod config;
mod crawl;
mod download;
mod error;
mod fetch;
mod logging;
mod policy;
mod report;
#[cfg(test)]
mod test_support;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use config::CrawlConfig;
use crawl::{CrawlComponents, CrawlEngine};
use download::{Downloader, Throttle};
use error::CrawlError;
use fetch::{Fetcher, HttpTransport, SessionConfig};
use policy::{ResourceMatcher, RobotsGate};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // A rejected start URL is a policy outcome, not an internal error
            if let Some(crawl_error) = e.downcast_ref::<CrawlError>() {
                eprintln!("Error: {}", crawl_error);
                1
            } else {
                eprintln!("Error: {:#}", e);
                2
            }
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose)?;

    let config = CrawlConfig::from_cli(&cli)?;
    handle_crawl(config, cli.json).await
}

async fn handle_crawl(config: CrawlConfig, json: bool) -> Result<i32> {
    info!(
        start_url = %config.start_url,
        download_dir = %config.download_dir.display(),
        domains = ?config.domains.patterns(),
        extension = %config.extension,
        workers = config.workers,
        robots = config.respect_robots,
        user_agent = %config.user_agent,
        "starting crawl"
    );

    let engine = build_engine(&config)?;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, finishing in-flight downloads");
            on_interrupt.cancel();
        }
    });

    match engine.run(cancel).await {
        Ok(report) => {
            report::print_report(&report, json)?;
            Ok(0)
        }
        Err(e) => {
            error!(error = %e, "crawl not started");
            Ok(1)
        }
    }
}

// Wires one crawl run together. The HTTP session is created here, once,
// and handed to every component that needs the network.
fn build_engine(config: &CrawlConfig) -> Result<CrawlEngine> {
    let session = SessionConfig {
        user_agent: config.user_agent.clone(),
        timeout: config.timeout,
        scope: config.domains.clone(),
    };
    let transport = HttpTransport::new(&session).context("failed to build HTTP client")?;
    let fetcher = Fetcher::new(Arc::new(transport), config.retry);

    let components = CrawlComponents {
        domains: config.domains.clone(),
        matcher: ResourceMatcher::new(&config.extension, config.domains.clone()),
        robots: RobotsGate::new(config.respect_robots, &config.user_agent, fetcher.clone()),
        downloader: Downloader::new(fetcher.clone(), &config.download_dir, config.layout),
        throttle: Throttle::new(config.download_delay),
        workers: config.workers,
        max_depth: config.max_depth,
        fetcher,
    };

    Ok(CrawlEngine::new(config.start_url.clone(), components))
}
