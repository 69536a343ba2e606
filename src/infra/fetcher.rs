// ============================================================
// Layer 6 — Archive Fetcher
// ============================================================
// Makes sure the source archive exists locally before we try
// to convert it.
//
//   archive present?  ──yes──▶  nothing to do, no network call
//        │
//        no
//        ▼
//   mkdir -p parent
//   GET url → <archive>.part
//   rename <archive>.part → <archive>
//
// The rename only happens after the whole body arrived, so a
// killed download never leaves a file that looks complete.
// There is no resume: the .part file is truncated on each try.
// There is no retry and no checksum either; a failure is fatal.

use anyhow::{Context, Result};
use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
    time::Duration,
};

use crate::domain::traits::Downloader;

/// What `ensure_archive` had to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    AlreadyPresent,
    Downloaded { bytes: u64 },
}

/// Downloads over HTTP(S) with a blocking reqwest client.
pub struct HttpDownloader {
    client: reqwest::blocking::Client,
}

impl HttpDownloader {
    pub fn new() -> Result<Self> {
        // The blocking client defaults to a 30s total timeout, far too
        // short for a multi-hundred-megabyte archive
        let client = reqwest::blocking::Client::builder()
            .timeout(None::<Duration>)
            .build()
            .context("Cannot build HTTP client")?;
        Ok(Self { client })
    }
}

impl Downloader for HttpDownloader {
    fn download(&self, url: &str, dest: &Path) -> Result<u64> {
        let mut response = self
            .client
            .get(url)
            .send()
            .with_context(|| format!("Request to '{url}' failed"))?
            .error_for_status()
            .with_context(|| format!("Server refused '{url}'"))?;

        let file = File::create(dest)
            .with_context(|| format!("Cannot create '{}'", dest.display()))?;
        let mut out = BufWriter::new(file);

        let bytes = response
            .copy_to(&mut out)
            .with_context(|| format!("Download from '{url}' was interrupted"))?;
        out.flush()
            .with_context(|| format!("Cannot write '{}'", dest.display()))?;

        Ok(bytes)
    }
}

/// Download `url` to `path` unless `path` already exists.
pub fn ensure_archive(
    url: &str,
    path: &Path,
    downloader: &dyn Downloader,
) -> Result<FetchOutcome> {
    if path.exists() {
        tracing::info!("Archive already present at '{}'", path.display());
        return Ok(FetchOutcome::AlreadyPresent);
    }

    tracing::info!("Downloading '{}' to '{}'", url, path.display());

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Cannot create directory '{}'", parent.display()))?;
    }

    let partial = partial_path(path);
    let bytes = downloader.download(url, &partial)?;
    fs::rename(&partial, path).with_context(|| {
        format!(
            "Cannot move '{}' into place at '{}'",
            partial.display(),
            path.display()
        )
    })?;

    tracing::info!("Downloaded {} bytes", bytes);
    Ok(FetchOutcome::Downloaded { bytes })
}

/// "<path>.part"
fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Writes a fixed body and remembers every URL it was asked for.
    struct FakeDownloader {
        body: Vec<u8>,
        calls: RefCell<Vec<String>>,
    }

    impl FakeDownloader {
        fn new(body: &[u8]) -> Self {
            Self {
                body: body.to_vec(),
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl Downloader for FakeDownloader {
        fn download(&self, url: &str, dest: &Path) -> Result<u64> {
            self.calls.borrow_mut().push(url.to_string());
            fs::write(dest, &self.body)?;
            Ok(self.body.len() as u64)
        }
    }

    struct FailingDownloader;

    impl Downloader for FailingDownloader {
        fn download(&self, url: &str, dest: &Path) -> Result<u64> {
            // Leave a partial body behind, like a dropped connection would
            fs::write(dest, b"half")?;
            anyhow::bail!("connection reset while fetching {url}")
        }
    }

    #[test]
    fn test_downloads_into_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("models").join("nested").join("vgg16.npz");
        let fake = FakeDownloader::new(b"archive bytes");

        let outcome = ensure_archive("http://example.test/vgg16.npz", &path, &fake).unwrap();

        assert_eq!(outcome, FetchOutcome::Downloaded { bytes: 13 });
        assert_eq!(fs::read(&path).unwrap(), b"archive bytes");
        assert!(!partial_path(&path).exists());
        assert_eq!(*fake.calls.borrow(), vec!["http://example.test/vgg16.npz"]);
    }

    #[test]
    fn test_second_run_makes_no_network_call() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vgg16.npz");
        let fake = FakeDownloader::new(b"abc");

        ensure_archive("http://example.test/a", &path, &fake).unwrap();
        let outcome = ensure_archive("http://example.test/a", &path, &fake).unwrap();

        assert_eq!(outcome, FetchOutcome::AlreadyPresent);
        assert_eq!(fake.calls.borrow().len(), 1);
    }

    #[test]
    fn test_existing_file_is_left_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vgg16.npz");
        fs::write(&path, b"local copy").unwrap();
        let fake = FakeDownloader::new(b"remote copy");

        ensure_archive("http://example.test/a", &path, &fake).unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"local copy");
        assert!(fake.calls.borrow().is_empty());
    }

    #[test]
    fn test_failed_download_leaves_no_archive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vgg16.npz");

        let err = ensure_archive("http://example.test/a", &path, &FailingDownloader).unwrap_err();

        assert!(err.to_string().contains("connection reset"));
        assert!(!path.exists());
    }

    #[test]
    fn test_partial_path_appends_suffix() {
        assert_eq!(
            partial_path(Path::new("models/vgg16.npz")),
            PathBuf::from("models/vgg16.npz.part")
        );
    }
}
