// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses arguments with clap and hands off to Layer 2.
//
//   npz2bin            — fetch + convert with the default paths
//   npz2bin convert    — same, with optional path/URL overrides
//   npz2bin inspect    — read a converted file back and verify it
//
// Progress is printed to stdout. Any error bubbles up to main,
// which exits non-zero with the full context chain.

pub mod commands;

use anyhow::{bail, Result};
use clap::Parser;
use commands::{Commands, InspectArgs};

use crate::application::convert_use_case::{ConvertConfig, ConvertUseCase};
use crate::application::inspect_use_case::InspectUseCase;
use crate::infra::fetcher::FetchOutcome;

#[derive(Parser, Debug)]
#[command(
    name = "npz2bin",
    version = "0.1.0",
    about = "Convert a NumPy .npz weight archive into a flat binary file plus JSON metadata."
)]
pub struct Cli {
    /// What to do. Omit to convert with the default paths.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Dispatch to the matching command handler.
    pub fn run(self) -> Result<()> {
        match self.command {
            None => run_convert(ConvertConfig::default()),
            Some(Commands::Convert(args)) => run_convert(args.into()),
            Some(Commands::Inspect(args)) => run_inspect(args),
        }
    }
}

/// Fetch (if needed) and convert, then report where everything went.
fn run_convert(config: ConvertConfig) -> Result<()> {
    tracing::debug!("Conversion config: {:?}", config);

    let summary = ConvertUseCase::new(config.clone()).execute()?;
    tracing::info!(
        "Wrote {} records across {} layers ({} bytes)",
        summary.records,
        summary.layers,
        summary.bytes_written
    );

    if let Some(FetchOutcome::Downloaded { .. }) = summary.fetch {
        println!("Model downloaded to {}", config.archive_path.display());
    }
    println!("Model converted to {}", config.bin_path.display());
    println!("Metadata saved to {}", config.metadata_path.display());
    println!("Conversion completed successfully!");
    Ok(())
}

/// Print every record of a weight file and fail on metadata mismatches.
fn run_inspect(args: InspectArgs) -> Result<()> {
    let (bin, metadata) = args.paths();
    let report = InspectUseCase::new(bin.clone(), metadata).execute()?;

    println!("{}: {} records", bin.display(), report.records.len());
    for record in &report.records {
        let head: Vec<String> = record
            .data
            .iter()
            .take(args.values)
            .map(|v| format!("{v:.6}"))
            .collect();
        let ellipsis = if record.data.len() > args.values { ", ..." } else { "" };
        println!(
            "  @{:<10} {:<24} {:?} [{}{}]",
            record.offset,
            record.name,
            record.shape,
            head.join(", "),
            ellipsis
        );
    }

    if let Some(layers) = report.layers {
        println!("Metadata: {layers} layers");
    }
    if !report.is_consistent() {
        for line in &report.mismatches {
            println!("  mismatch: {line}");
        }
        bail!("{} metadata mismatches", report.mismatches.len());
    }
    Ok(())
}
