// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the `convert` and `inspect` subcommands.
//
// Every flag has a default, so `npz2bin convert` with no flags
// does exactly what a bare `npz2bin` does.

use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::application::convert_use_case::{
    default_models_dir, ConvertConfig, BIN_FILE, DEFAULT_URL, METADATA_FILE,
};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download the archive if needed and convert it (the default)
    Convert(ConvertArgs),

    /// Read a converted weight file back and check it against its metadata
    Inspect(InspectArgs),
}

/// All arguments for the `convert` command.
#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Directory holding the archive and the converted files
    /// [default: models/ next to this crate]
    #[arg(long)]
    pub models_dir: Option<PathBuf>,

    /// Where to download the archive from when it is missing
    #[arg(long, default_value = DEFAULT_URL)]
    pub url: String,

    /// Source .npz archive [default: <models-dir>/vgg16.npz]
    #[arg(long)]
    pub archive: Option<PathBuf>,

    /// Binary weight output [default: <models-dir>/vgg16.bin]
    #[arg(long)]
    pub bin: Option<PathBuf>,

    /// JSON metadata output [default: <models-dir>/vgg16_metadata.json]
    #[arg(long)]
    pub metadata: Option<PathBuf>,

    /// Fail instead of downloading when the archive is missing
    #[arg(long)]
    pub no_download: bool,
}

/// Convert CLI args into the application-layer ConvertConfig.
impl From<ConvertArgs> for ConvertConfig {
    fn from(a: ConvertArgs) -> Self {
        let defaults = ConvertConfig::in_dir(a.models_dir.unwrap_or_else(default_models_dir));
        ConvertConfig {
            url:           a.url,
            archive_path:  a.archive.unwrap_or(defaults.archive_path),
            bin_path:      a.bin.unwrap_or(defaults.bin_path),
            metadata_path: a.metadata.unwrap_or(defaults.metadata_path),
            download:      !a.no_download,
        }
    }
}

/// All arguments for the `inspect` command
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Binary weight file to read [default: models/vgg16.bin]
    #[arg(long)]
    pub bin: Option<PathBuf>,

    /// Metadata file to check against [default: models/vgg16_metadata.json
    /// when --bin is not given]
    #[arg(long)]
    pub metadata: Option<PathBuf>,

    /// Skip the metadata check
    #[arg(long, conflicts_with = "metadata")]
    pub no_metadata: bool,

    /// How many leading values to print per record
    #[arg(long, default_value_t = 4)]
    pub values: usize,
}

impl InspectArgs {
    /// Resolve the (bin, metadata) pair to read
    pub fn paths(&self) -> (PathBuf, Option<PathBuf>) {
        let models_dir = default_models_dir();
        let metadata = if self.no_metadata {
            None
        } else {
            match (&self.metadata, &self.bin) {
                (Some(path), _) => Some(path.clone()),
                (None, None) => Some(models_dir.join(METADATA_FILE)),
                // An explicit --bin with no --metadata: don't guess
                (None, Some(_)) => None,
            }
        };
        let bin = self.bin.clone().unwrap_or_else(|| models_dir.join(BIN_FILE));
        (bin, metadata)
    }
}
