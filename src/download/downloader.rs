// src/download/downloader.rs
// =============================================================================
// Persists a target resource to disk.
//
// Steps for one download:
// 1. Fetch the full body through the shared (retrying) Fetcher
// 2. Derive the destination path from the URL path, under the download root
// 3. Create missing parent directories (the download root included)
// 4. Write to a fresh "<name>.XXXXXX.part" file next to the destination,
//    then rename it over the destination
//
// Because of step 4 a failed or abandoned download never leaves a truncated
// file at the final path, and re-downloading the same URL simply replaces the
// previous copy. Every write gets its own temp file, so two workers that map
// to the same destination never share one; the last rename wins.
//
// Path layout:
//   Flat    https://x.test/us-25/talk.pdf  ->  <root>/us-25/talk.pdf
//   ByHost  https://x.test/us-25/talk.pdf  ->  <root>/x.test/us-25/talk.pdf
// With Flat, two hosts serving the same path overwrite each other.
// =============================================================================

use crate::error::DownloadError;
use crate::fetch::Fetcher;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{error, info};
use url::Url;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PathLayout {
    #[default]
    Flat,
    ByHost,
}

// Outcome of one download attempt, kept for the final report
#[derive(Debug, Clone, Serialize)]
pub struct DownloadRecord {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DownloadRecord {
    pub fn success(url: &Url, path: PathBuf, bytes: u64) -> Self {
        Self {
            url: url.to_string(),
            path: Some(path),
            bytes: Some(bytes),
            error: None,
        }
    }

    pub fn failure(url: &Url, error: &DownloadError) -> Self {
        Self {
            url: url.to_string(),
            path: None,
            bytes: None,
            error: Some(error.to_string()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct Downloader {
    fetcher: Fetcher,
    root: PathBuf,
    layout: PathLayout,
}

impl Downloader {
    pub fn new(fetcher: Fetcher, root: impl Into<PathBuf>, layout: PathLayout) -> Self {
        Self {
            fetcher,
            root: root.into(),
            layout,
        }
    }

    pub async fn download(&self, url: &Url) -> Result<(PathBuf, u64), DownloadError> {
        // Reject bad paths before spending a request on them
        let destination = self.destination_for(url)?;
        let fetched = self.fetcher.fetch(url).await?;
        let bytes = fetched.body.len() as u64;

        write_then_rename(destination.clone(), fetched.body).await?;
        Ok((destination, bytes))
    }

    // Runs a download and turns the outcome into a logged record
    pub async fn download_record(&self, url: &Url) -> DownloadRecord {
        match self.download(url).await {
            Ok((path, bytes)) => {
                info!(url = %url, path = %path.display(), bytes, "downloaded");
                DownloadRecord::success(url, path, bytes)
            }
            Err(e) => {
                error!(url = %url, error = %e, "download failed");
                DownloadRecord::failure(url, &e)
            }
        }
    }

    pub fn destination_for(&self, url: &Url) -> Result<PathBuf, DownloadError> {
        let unsafe_path = |reason: &str| DownloadError::UnsafePath {
            url: url.to_string(),
            reason: reason.to_string(),
        };

        let segments: Vec<&str> = url
            .path_segments()
            .ok_or_else(|| unsafe_path("URL has no path"))?
            .collect();

        match segments.last() {
            Some(name) if !name.is_empty() => {}
            _ => return Err(unsafe_path("URL path does not name a file")),
        }

        let mut path = self.root.clone();
        if self.layout == PathLayout::ByHost {
            let host = url.host_str().ok_or_else(|| unsafe_path("URL has no host"))?;
            path.push(host);
        }

        // Leading and doubled slashes produce empty segments; skip them
        for segment in segments.iter().filter(|s| !s.is_empty()) {
            if *segment == "." || *segment == ".." || segment.contains('\\') {
                return Err(unsafe_path("path escapes the download directory"));
            }
            path.push(segment);
        }

        Ok(path)
    }
}

async fn write_then_rename(destination: PathBuf, body: Vec<u8>) -> Result<(), DownloadError> {
    let task_destination = destination.clone();
    tokio::task::spawn_blocking(move || persist(&task_destination, &body))
        .await
        .map_err(|e| DownloadError::Filesystem {
            path: destination,
            source: std::io::Error::new(std::io::ErrorKind::Other, e),
        })?
}

// Dropping a NamedTempFile deletes it, so every early return cleans up
fn persist(destination: &Path, body: &[u8]) -> Result<(), DownloadError> {
    let fs_error = |path: &Path, source: std::io::Error| DownloadError::Filesystem {
        path: path.to_path_buf(),
        source,
    };

    let parent = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(|e| fs_error(parent, e))?;

    let mut prefix = destination
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    prefix.push(".");

    let mut partial = tempfile::Builder::new()
        .prefix(&prefix)
        .suffix(".part")
        .tempfile_in(parent)
        .map_err(|e| fs_error(parent, e))?;

    partial.write_all(body).map_err(|e| fs_error(partial.path(), e))?;

    partial
        .persist(destination)
        .map_err(|e| fs_error(destination, e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::RetryPolicy;
    use crate::test_support::FakeTransport;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    // Temp files left anywhere under `dir`
    fn leftover_partials(dir: &Path) -> Vec<PathBuf> {
        let mut found = Vec::new();
        for entry in std::fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                found.extend(leftover_partials(&path));
            } else if path.extension().map_or(false, |ext| ext == "part") {
                found.push(path);
            }
        }
        found
    }

    fn downloader(fake: Arc<FakeTransport>, root: &Path, layout: PathLayout) -> Downloader {
        Downloader::new(Fetcher::new(fake, RetryPolicy::none()), root, layout)
    }

    #[test]
    fn test_flat_layout_strips_leading_slash() {
        let d = downloader(Arc::new(FakeTransport::new()), Path::new("out"), PathLayout::Flat);
        let path = d.destination_for(&url("https://x.test/us-25/briefings/talk.pdf")).unwrap();
        assert_eq!(path, Path::new("out").join("us-25").join("briefings").join("talk.pdf"));
    }

    #[test]
    fn test_by_host_layout() {
        let d = downloader(Arc::new(FakeTransport::new()), Path::new("out"), PathLayout::ByHost);
        let path = d.destination_for(&url("https://x.test//talk.pdf?v=2")).unwrap();
        assert_eq!(path, Path::new("out").join("x.test").join("talk.pdf"));
    }

    #[test]
    fn test_rejects_paths_without_file_name() {
        let d = downloader(Arc::new(FakeTransport::new()), Path::new("out"), PathLayout::Flat);
        assert!(matches!(
            d.destination_for(&url("https://x.test/docs/")),
            Err(DownloadError::UnsafePath { .. })
        ));
    }

    #[test]
    fn test_dot_segments_stay_inside_root() {
        let d = downloader(Arc::new(FakeTransport::new()), Path::new("out"), PathLayout::Flat);
        assert_eq!(
            d.destination_for(&url("https://x.test/a/%2e%2e/%2E%2E/etc.pdf")).unwrap(),
            Path::new("out").join("etc.pdf")
        );
        assert_eq!(
            d.destination_for(&url("https://x.test/a/../../etc.pdf")).unwrap(),
            Path::new("out").join("etc.pdf")
        );
    }

    #[tokio::test]
    async fn test_download_writes_file_and_creates_dirs() {
        let dir = TempDir::new().unwrap();
        let fake = Arc::new(FakeTransport::new().file("https://x.test/a/b/talk.pdf", b"%PDF-1.7 body"));
        let d = downloader(fake, dir.path(), PathLayout::Flat);

        let (path, bytes) = d.download(&url("https://x.test/a/b/talk.pdf")).await.unwrap();

        assert_eq!(path, dir.path().join("a").join("b").join("talk.pdf"));
        assert_eq!(bytes, 13);
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.7 body");
        assert!(leftover_partials(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn test_download_root_is_created_on_first_write() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("not").join("yet");
        let fake = Arc::new(FakeTransport::new().file("https://x.test/talk.pdf", b"pdf"));
        let d = downloader(fake, &root, PathLayout::Flat);

        d.download(&url("https://x.test/talk.pdf")).await.unwrap();

        assert_eq!(std::fs::read(root.join("talk.pdf")).unwrap(), b"pdf");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_writers_to_same_path_do_not_clash() {
        let dir = TempDir::new().unwrap();
        let first = vec![b'a'; 8 * 1024 * 1024];
        let second = vec![b'b'; 8 * 1024 * 1024];
        let fake = Arc::new(
            FakeTransport::new()
                .file("https://a.x.test/talk.pdf", &first)
                .file("https://b.x.test/talk.pdf", &second),
        );
        let d = Arc::new(downloader(fake, dir.path(), PathLayout::Flat));

        for _ in 0..5 {
            let (a, b) = (d.clone(), d.clone());
            let (ra, rb) = tokio::join!(
                tokio::spawn(async move { a.download(&url("https://a.x.test/talk.pdf")).await }),
                tokio::spawn(async move { b.download(&url("https://b.x.test/talk.pdf")).await }),
            );
            let (path_a, _) = ra.unwrap().unwrap();
            let (path_b, _) = rb.unwrap().unwrap();
            assert_eq!(path_a, path_b);

            // One writer's complete file, never a mix of both
            let written = std::fs::read(&path_a).unwrap();
            assert!(written == first || written == second);
            assert!(leftover_partials(dir.path()).is_empty());
        }
    }

    #[tokio::test]
    async fn test_redownload_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let fake = Arc::new(FakeTransport::new().file("https://x.test/talk.pdf", b"same bytes"));
        let d = downloader(fake, dir.path(), PathLayout::Flat);
        let target = url("https://x.test/talk.pdf");

        let (first, _) = d.download(&target).await.unwrap();
        let original = std::fs::read(&first).unwrap();
        std::fs::remove_file(&first).unwrap();

        let (second, _) = d.download(&target).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(std::fs::read(&second).unwrap(), original);

        // Overwrites silently
        let (third, _) = d.download(&target).await.unwrap();
        assert_eq!(std::fs::read(&third).unwrap(), original);
    }

    #[tokio::test]
    async fn test_failed_fetch_leaves_no_file() {
        let dir = TempDir::new().unwrap();
        let fake = Arc::new(FakeTransport::new().status("https://x.test/gone.pdf", 404));
        let d = downloader(fake, dir.path(), PathLayout::Flat);

        let record = d.download_record(&url("https://x.test/gone.pdf")).await;

        assert!(!record.is_ok());
        assert!(record.error.unwrap().contains("404"));
        assert!(!dir.path().join("gone.pdf").exists());
    }

    #[tokio::test]
    async fn test_filesystem_error_is_reported() {
        let dir = TempDir::new().unwrap();
        // A plain file where a directory needs to go
        std::fs::write(dir.path().join("a"), b"not a dir").unwrap();
        let fake = Arc::new(FakeTransport::new().file("https://x.test/a/talk.pdf", b"x"));
        let d = downloader(fake, dir.path(), PathLayout::Flat);

        let err = d.download(&url("https://x.test/a/talk.pdf")).await.unwrap_err();
        assert!(matches!(err, DownloadError::Filesystem { .. }));
    }
}
