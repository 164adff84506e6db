// src/crawl/mod.rs
// =============================================================================
// This module handles website crawling.
//
// Features:
// - Breadth-first crawling starting from a seed URL
// - Allow-listed domains only (exact or wildcard hosts)
// - Every page fetched at most once, cycles included
// - Target files handed to a bounded, throttled download pool
// - Cooperative cancellation
// =============================================================================

mod engine;
mod links;

pub use engine::{CrawlComponents, CrawlEngine, CrawlState};
