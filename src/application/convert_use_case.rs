// ============================================================
// Layer 2 — ConvertUseCase
// ============================================================
// Orchestrates the conversion pipeline in order:
//
//   Step 1: Fetch the archive if missing   (Layer 6 - infra)
//   Step 2: Open the archive               (Layer 4 - data)
//   Step 3: Write the binary weight file   (Layer 6 - infra)
//           while building the metadata    (Layer 3 - domain)
//   Step 4: Save the metadata JSON         (Layer 6 - infra)
//
// A failure in step 3 leaves a truncated .bin behind and no
// metadata file. Nothing is rolled back.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::BufWriter,
    path::{Path, PathBuf},
};

use crate::data::npz::NpzArchive;
use crate::domain::{
    metadata::{ModelMetadata, ParamEntry},
    traits::{Downloader, ParameterSource},
};
use crate::infra::{
    fetcher::{ensure_archive, FetchOutcome, HttpDownloader},
    metadata_store::save_metadata,
    weight_writer::WeightWriter,
};

/// Where the pretrained VGG16 weights are published
pub const DEFAULT_URL: &str = "http://models.tensorpack.com/Caffe-Converted/vgg16.npz";

pub const ARCHIVE_FILE: &str = "vgg16.npz";
pub const BIN_FILE: &str = "vgg16.bin";
pub const METADATA_FILE: &str = "vgg16_metadata.json";

/// `models/` next to this crate's manifest
pub fn default_models_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("models")
}

// ─── Conversion Configuration ────────────────────────────────────────────────
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvertConfig {
    pub url:           String,
    pub archive_path:  PathBuf,
    pub bin_path:      PathBuf,
    pub metadata_path: PathBuf,
    /// Fetch the archive when it is missing
    pub download:      bool,
}

impl ConvertConfig {
    /// The standard file names inside `models_dir`
    pub fn in_dir(models_dir: impl AsRef<Path>) -> Self {
        let dir = models_dir.as_ref();
        Self {
            url:           DEFAULT_URL.to_string(),
            archive_path:  dir.join(ARCHIVE_FILE),
            bin_path:      dir.join(BIN_FILE),
            metadata_path: dir.join(METADATA_FILE),
            download:      true,
        }
    }
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self::in_dir(default_models_dir())
    }
}

/// What a conversion produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertSummary {
    /// `None` when fetching was turned off
    pub fetch:         Option<FetchOutcome>,
    pub records:       usize,
    pub layers:        usize,
    pub bytes_written: u64,
}

// ─── ConvertUseCase ───────────────────────────────────────────────────────────
pub struct ConvertUseCase {
    config: ConvertConfig,
}

impl ConvertUseCase {
    pub fn new(config: ConvertConfig) -> Self {
        Self { config }
    }

    /// Fetch over HTTP if needed, then convert
    pub fn execute(&self) -> Result<ConvertSummary> {
        if self.config.download && !self.config.archive_path.exists() {
            let downloader = HttpDownloader::new()?;
            return self.execute_with(&downloader);
        }

        let mut summary = self.convert()?;
        if self.config.download {
            summary.fetch = Some(FetchOutcome::AlreadyPresent);
        }
        Ok(summary)
    }

    /// Same as `execute`, with the network transport supplied by the caller
    pub fn execute_with(&self, downloader: &dyn Downloader) -> Result<ConvertSummary> {
        let cfg = &self.config;

        // ── Step 1: Make sure the archive is on disk ─────────────────────────
        let fetch = if cfg.download {
            Some(ensure_archive(&cfg.url, &cfg.archive_path, downloader)?)
        } else {
            None
        };

        let summary = self.convert()?;
        Ok(ConvertSummary { fetch, ..summary })
    }

    fn convert(&self) -> Result<ConvertSummary> {
        let cfg = &self.config;
        convert_archive(&cfg.archive_path, &cfg.bin_path, &cfg.metadata_path)
    }
}

/// Convert an .npz archive into a weight file and its metadata sidecar.
pub fn convert_archive(
    archive_path:  &Path,
    bin_path:      &Path,
    metadata_path: &Path,
) -> Result<ConvertSummary> {
    tracing::info!(
        "Converting '{}' into '{}'",
        archive_path.display(),
        bin_path.display()
    );

    // ── Step 2: Open the archive ──────────────────────────────────────────────
    let mut archive = NpzArchive::open(archive_path)?;
    tracing::info!(
        "'{}' holds {} parameters",
        archive.path().display(),
        archive.len()
    );

    // ── Step 3: Write every record, collecting offsets as we go ──────────────
    let (metadata, bytes_written) = write_weights(&mut archive, bin_path)?;

    // ── Step 4: Save the metadata sidecar ─────────────────────────────────────
    save_metadata(metadata_path, &metadata)?;

    Ok(ConvertSummary {
        fetch: None,
        records: archive.len(),
        layers: metadata.len(),
        bytes_written,
    })
}

/// Write every parameter of `source` to `bin_path`, in source order.
///
/// Returns the metadata describing each record and the total file size.
pub fn write_weights(
    source:   &mut dyn ParameterSource,
    bin_path: &Path,
) -> Result<(ModelMetadata, u64)> {
    let names = source.names().to_vec();

    let file = File::create(bin_path)
        .with_context(|| format!("Cannot create weight file '{}'", bin_path.display()))?;
    let mut writer = WeightWriter::new(BufWriter::new(file));
    let mut metadata = ModelMetadata::new();

    writer
        .write_header(names.len())
        .with_context(|| format!("Cannot write to '{}'", bin_path.display()))?;

    for name in &names {
        let param = source.load(name)?;

        // The offset points at the record's name-length field
        let entry = ParamEntry {
            shape:  param.shape.clone(),
            offset: writer.position(),
            size:   param.size(),
        };
        if let Some(previous) = metadata.record(&param.name, entry) {
            tracing::warn!(
                "'{}' replaces the {} entry of layer '{}' (was at offset {})",
                param.name,
                param.kind(),
                param.layer_name(),
                previous.offset
            );
        }

        writer
            .write_record(&param)
            .with_context(|| format!("Cannot write '{}' to '{}'", name, bin_path.display()))?;

        tracing::debug!(
            "Wrote {} {:?} ({} values)",
            param.name,
            param.shape,
            param.size()
        );
    }

    let bytes_written = writer.position();
    writer.finish()?;
    Ok((metadata, bytes_written))
}
