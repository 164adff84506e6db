// src/logging.rs
// =============================================================================
// Structured logging setup.
//
// Every crawl step logs through `tracing` with key=value fields
// (url=..., attempt=..., path=...). Here we install a subscriber that prints
// those events to stderr, leaving stdout free for the final report (and for
// clean --json output).
//
// Filtering:
// - RUST_LOG wins when set (e.g. RUST_LOG=pdf_harvester=trace,reqwest=debug)
// - otherwise "info" for this crate, or "debug" with --verbose
// =============================================================================

use anyhow::{anyhow, Result};
use tracing_subscriber::{fmt, EnvFilter};

pub fn init_logging(verbose: bool) -> Result<()> {
    let default_directive = if verbose {
        "warn,pdf_harvester=debug"
    } else {
        "warn,pdf_harvester=info"
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .compact()
        .try_init()
        .map_err(|e| anyhow!("failed to initialize logging: {}", e))
}
