// src/report.rs
// =============================================================================
// What a finished crawl hands back, and how we print it.
//
// The report is either printed as a human-readable table or serialized to
// JSON (--json) so the output can be consumed by other tools.
// =============================================================================

use crate::crawl::CrawlState;
use crate::download::DownloadRecord;
use anyhow::Result;
use serde::Serialize;

// A page that could not be fetched (after the retry budget)
#[derive(Debug, Clone, Serialize)]
pub struct PageFailure {
    pub url: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CrawlReport {
    pub state: CrawlState,
    /// Pages in the order they were dequeued and fetched
    pub pages_visited: Vec<String>,
    pub pages_failed: Vec<PageFailure>,
    pub downloads: Vec<DownloadRecord>,
}

impl CrawlReport {
    pub fn downloaded(&self) -> usize {
        self.downloads.iter().filter(|d| d.is_ok()).count()
    }

    pub fn failed_downloads(&self) -> usize {
        self.downloads.len() - self.downloaded()
    }

    pub fn bytes_written(&self) -> u64 {
        self.downloads.iter().filter_map(|d| d.bytes).sum()
    }
}

pub fn print_report(report: &CrawlReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        print_table(report);
    }
    Ok(())
}

fn print_table(report: &CrawlReport) {
    if !report.downloads.is_empty() {
        println!("{:<70} {:<10} {:<30}", "URL", "STATUS", "DETAIL");
        println!("{}", "=".repeat(110));

        for record in &report.downloads {
            let url_display = truncate(&record.url, 67);
            let (status, detail) = match (&record.path, &record.error) {
                (Some(path), _) => ("✅ SAVED", path.display().to_string()),
                (None, Some(error)) => ("❌ FAILED", error.clone()),
                (None, None) => ("⚠️  UNKNOWN", String::new()),
            };
            println!("{:<70} {:<10} {:<30}", url_display, status, detail);
        }
        println!();
    }

    println!("📊 Summary ({:?}):", report.state);
    println!("   🌐 Pages crawled: {}", report.pages_visited.len());
    println!("   ⚠️  Pages failed: {}", report.pages_failed.len());
    println!("   ✅ Files saved: {} ({} bytes)", report.downloaded(), report.bytes_written());
    println!("   ❌ Files failed: {}", report.failed_downloads());
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let head: String = s.chars().take(max).collect();
        format!("{}...", head)
    } else {
        s.to_string()
    }
}
