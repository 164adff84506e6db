// src/crawl/engine.rs
// =============================================================================
// Breadth-first crawl that downloads every target resource it discovers.
//
// How it works:
// 1. Start with the seed URL in the frontier (a FIFO queue)
// 2. Pop a URL; skip it if already visited, out of scope, or robots-blocked
// 3. Mark it visited, fetch it, extract its links
// 4. Links that are target resources (e.g. PDFs on allowed domains) go to the
//    download pool; other in-scope links are appended to the frontier
// 5. Repeat until the frontier is empty (Drained) or a stop is requested
//
// "Visited" means "dequeued", not "fetched successfully": a page that keeps
// failing is tried once (plus the fetcher's own retries) and never re-queued,
// so the crawl always terminates, even on cyclic sites.
//
// Concurrency:
// - this engine is the only owner of the frontier and visited set; page
//   traversal runs on one task
// - downloads run on spawned tasks, at most `workers` at a time (semaphore),
//   all sharing one Throttle so the delay applies to the total request rate
// =============================================================================

use crate::crawl::links::extract_links;
use crate::download::{DownloadRecord, Downloader, Throttle};
use crate::error::{CrawlError, DownloadError, FetchError};
use crate::fetch::{Document, Fetcher};
use crate::policy::{DomainPolicy, ResourceMatcher, RobotsGate};
use crate::report::{CrawlReport, PageFailure};
use serde::Serialize;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CrawlState {
    /// Seeded, not started
    Idle,
    Running,
    /// Frontier exhausted; the run is complete
    Drained,
    /// Stopped early on request
    Cancelled,
}

// Everything the engine drives, built once per run
pub struct CrawlComponents {
    pub domains: DomainPolicy,
    pub matcher: ResourceMatcher,
    pub robots: RobotsGate,
    pub fetcher: Fetcher,
    pub downloader: Downloader,
    pub throttle: Throttle,
    /// Maximum concurrent downloads (at least 1)
    pub workers: usize,
    /// 1 = only the seed page; None = unlimited
    pub max_depth: Option<usize>,
}

// A page waiting in the frontier
#[derive(Debug, Clone)]
struct CrawlItem {
    url: Url,
    depth: usize,
}

pub struct CrawlEngine {
    state: CrawlState,
    seed: Url,

    frontier: VecDeque<CrawlItem>,
    /// Keys of URLs currently sitting in the frontier
    queued: HashSet<String>,
    visited: HashSet<String>,
    /// Target resources already handed to a download worker
    dispatched: HashSet<String>,

    pages_visited: Vec<String>,
    pages_failed: Vec<PageFailure>,

    domains: DomainPolicy,
    matcher: ResourceMatcher,
    robots: RobotsGate,
    fetcher: Fetcher,
    downloader: Arc<Downloader>,
    throttle: Arc<Throttle>,
    workers: Arc<Semaphore>,
    max_depth: Option<usize>,
    downloads: JoinSet<DownloadRecord>,
}

impl CrawlEngine {
    pub fn new(seed: Url, components: CrawlComponents) -> Self {
        let mut frontier = VecDeque::new();
        frontier.push_back(CrawlItem {
            url: seed.clone(),
            depth: 1,
        });
        let queued = HashSet::from([seed.to_string()]);

        Self {
            state: CrawlState::Idle,
            seed,
            frontier,
            queued,
            visited: HashSet::new(),
            dispatched: HashSet::new(),
            pages_visited: Vec::new(),
            pages_failed: Vec::new(),
            domains: components.domains,
            matcher: components.matcher,
            robots: components.robots,
            fetcher: components.fetcher,
            downloader: Arc::new(components.downloader),
            throttle: Arc::new(components.throttle),
            workers: Arc::new(Semaphore::new(components.workers.max(1))),
            max_depth: components.max_depth,
            downloads: JoinSet::new(),
        }
    }

    // Runs the crawl to completion (or until `cancel` fires).
    //
    // The only error is a rejected start URL; every per-URL failure is
    // logged and recorded in the report instead.
    pub async fn run(mut self, cancel: CancellationToken) -> Result<CrawlReport, CrawlError> {
        self.check_start().await?;

        self.state = CrawlState::Running;
        info!(seed = %self.seed, "crawl started");

        while let Some(item) = self.frontier.pop_front() {
            if cancel.is_cancelled() {
                break;
            }
            self.queued.remove(item.url.as_str());
            self.process(item, &cancel).await;
        }

        let pending = self.frontier.len();
        let downloads = self.collect_downloads().await;

        // A stop that lands while downloads are still queued also counts
        self.state = if cancel.is_cancelled() {
            warn!(pending, "crawl cancelled");
            CrawlState::Cancelled
        } else {
            CrawlState::Drained
        };
        info!(
            state = ?self.state,
            pages = self.pages_visited.len(),
            downloads = downloads.len(),
            "crawl finished"
        );

        Ok(CrawlReport {
            state: self.state,
            pages_visited: self.pages_visited,
            pages_failed: self.pages_failed,
            downloads,
        })
    }

    // A seed outside the allowed scope means there is nothing to crawl
    async fn check_start(&mut self) -> Result<(), CrawlError> {
        if !self.domains.is_allowed_url(&self.seed) {
            return Err(CrawlError::PolicyRejection {
                url: self.seed.to_string(),
                reason: "host is not in the allowed domains".to_string(),
            });
        }
        if !self.robots.is_allowed(&self.seed).await {
            return Err(CrawlError::PolicyRejection {
                url: self.seed.to_string(),
                reason: "disallowed by robots.txt".to_string(),
            });
        }
        Ok(())
    }

    async fn process(&mut self, item: CrawlItem, cancel: &CancellationToken) {
        let key = item.url.to_string();

        if self.visited.contains(&key) {
            return;
        }
        if !self.domains.is_allowed_url(&item.url) {
            debug!(url = %item.url, "out of scope, skipping");
            return;
        }
        if !self.robots.is_allowed(&item.url).await {
            info!(url = %item.url, "blocked by robots.txt, skipping");
            return;
        }

        self.visited.insert(key.clone());
        self.pages_visited.push(key.clone());
        info!(url = %item.url, depth = item.depth, queued = self.frontier.len(), "processing");

        let fetched = tokio::select! {
            _ = cancel.cancelled() => return,
            fetched = self.fetcher.fetch_document(&item.url) => fetched,
        };

        let document = match fetched.and_then(|document| self.check_landing(&item.url, document)) {
            Ok(document) => document,
            Err(e) => {
                warn!(url = %item.url, error = %e, "failed to fetch page");
                self.pages_failed.push(PageFailure {
                    url: key,
                    error: e.to_string(),
                });
                return;
            }
        };

        let links = extract_links(&document.html, &document.url);
        debug!(url = %item.url, links = links.len(), "extracted links");

        let can_descend = self.max_depth.map_or(true, |max| item.depth < max);

        for link in links {
            if self.matcher.is_target_resource(&link) {
                self.dispatch_download(link, cancel).await;
            } else if can_descend {
                self.enqueue(link, item.depth + 1);
            }
        }
    }

    // A redirected page only counts if it landed inside the allowed domains.
    // The landing URL is marked visited so it is not fetched a second time.
    fn check_landing(&mut self, requested: &Url, document: Document) -> Result<Document, FetchError> {
        if document.url == *requested {
            return Ok(document);
        }
        if !self.domains.is_allowed_url(&document.url) {
            return Err(FetchError::Redirect {
                url: requested.to_string(),
                reason: format!("landed on {} outside the allowed domains", document.url),
            });
        }

        debug!(url = %requested, landed = %document.url, "followed redirect");
        self.visited.insert(document.url.to_string());
        Ok(document)
    }

    fn enqueue(&mut self, url: Url, depth: usize) {
        let key = url.to_string();
        if self.visited.contains(&key) || self.queued.contains(&key) {
            return;
        }
        if !self.domains.is_allowed_url(&url) {
            return;
        }

        self.queued.insert(key);
        self.frontier.push_back(CrawlItem { url, depth });
    }

    async fn dispatch_download(&mut self, url: Url, cancel: &CancellationToken) {
        let key = url.to_string();
        if self.dispatched.contains(&key) {
            return;
        }
        if !self.robots.is_allowed(&url).await {
            info!(url = %url, "download blocked by robots.txt");
            return;
        }

        self.dispatched.insert(key);
        debug!(url = %url, "queued for download");

        let downloader = self.downloader.clone();
        let throttle = self.throttle.clone();
        let workers = self.workers.clone();
        let cancel = cancel.clone();

        self.downloads
            .spawn(download_when_ready(url, downloader, throttle, workers, cancel));
    }

    async fn collect_downloads(&mut self) -> Vec<DownloadRecord> {
        let mut records = Vec::new();
        while let Some(joined) = self.downloads.join_next().await {
            match joined {
                Ok(record) => records.push(record),
                Err(e) => error!(error = %e, "download task panicked"),
            }
        }
        records
    }
}

// Waits for a free worker and the throttle, then downloads.
// A cancellation that arrives before the transfer starts abandons it.
async fn download_when_ready(
    url: Url,
    downloader: Arc<Downloader>,
    throttle: Arc<Throttle>,
    workers: Arc<Semaphore>,
    cancel: CancellationToken,
) -> DownloadRecord {
    let ready = async {
        let permit = workers.acquire_owned().await.ok();
        throttle.wait_turn().await;
        permit
    };

    let _permit = tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            let abandoned = DownloadError::Cancelled { url: url.to_string() };
            debug!(url = %url, "download abandoned");
            return DownloadRecord::failure(&url, &abandoned);
        }
        permit = ready => permit,
    };

    downloader.download_record(&url).await
}
