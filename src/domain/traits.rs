// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The two seams of the converter:
//
//   ParameterSource — something we can pull named arrays out of
//     - NpzArchive  → a NumPy .npz file on disk
//     - (tests)     → in-memory fixtures
//
//   Downloader — something that can copy a URL to a file
//     - HttpDownloader → reqwest blocking client
//     - (tests)        → counting fakes, so fetch logic can be
//                        exercised without a network

use anyhow::Result;
use std::path::Path;

use crate::domain::parameter::Parameter;

// ─── ParameterSource ──────────────────────────────────────────────────────────
/// An archive of named arrays.
pub trait ParameterSource {
    /// Member names in the order the archive exposes them.
    /// This order is also the record order of the binary output.
    fn names(&self) -> &[String];

    /// Load one member as an f32 row-major array.
    fn load(&mut self, name: &str) -> Result<Parameter>;
}

// ─── Downloader ───────────────────────────────────────────────────────────────
/// Transfers a remote resource's bytes verbatim to a local file.
pub trait Downloader {
    /// Download `url` into `dest`, truncating it first.
    /// Returns the number of bytes written.
    fn download(&self, url: &str, dest: &Path) -> Result<u64>;
}
