// src/download/mod.rs
// =============================================================================
// Saving target resources to disk.
//
// Submodules:
// - downloader: fetch + derive path + write-then-rename
// - throttle: minimum delay between downloads, shared by all workers
// =============================================================================

mod downloader;
mod throttle;

pub use downloader::{DownloadRecord, Downloader, PathLayout};
pub use throttle::Throttle;
