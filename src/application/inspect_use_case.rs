// ============================================================
// Layer 2 — InspectUseCase
// ============================================================
// Reads a converted weight file back and, when a metadata file
// is given, checks that every metadata entry points at a record
// with the same offset, shape, and size.
//
// This is the loader side of the format, used to sanity check a
// conversion before shipping the files to the runtime.

use anyhow::Result;
use std::{collections::HashMap, path::PathBuf};

use crate::domain::{
    metadata::ModelMetadata,
    parameter::{layer_name, ParamKind},
};
use crate::infra::{
    metadata_store::load_metadata,
    weight_reader::{read_weight_file, Record},
};

/// Result of inspecting a weight file
#[derive(Debug, Clone)]
pub struct InspectReport {
    pub records:    Vec<Record>,
    /// Metadata layers, when a metadata file was checked
    pub layers:     Option<usize>,
    /// One human-readable line per inconsistency
    pub mismatches: Vec<String>,
}

impl InspectReport {
    pub fn is_consistent(&self) -> bool {
        self.mismatches.is_empty()
    }
}

pub struct InspectUseCase {
    bin_path:      PathBuf,
    metadata_path: Option<PathBuf>,
}

impl InspectUseCase {
    pub fn new(bin_path: PathBuf, metadata_path: Option<PathBuf>) -> Self {
        Self {
            bin_path,
            metadata_path,
        }
    }

    pub fn execute(&self) -> Result<InspectReport> {
        let records = read_weight_file(&self.bin_path)?;
        tracing::info!(
            "Read {} records from '{}'",
            records.len(),
            self.bin_path.display()
        );

        let (layers, mismatches) = match &self.metadata_path {
            Some(path) => {
                let metadata = load_metadata(path)?;
                (Some(metadata.len()), verify(&records, &metadata))
            }
            None => (None, Vec::new()),
        };

        Ok(InspectReport {
            records,
            layers,
            mismatches,
        })
    }
}

/// Check every metadata entry against the records it points at.
pub fn verify(records: &[Record], metadata: &ModelMetadata) -> Vec<String> {
    let by_offset: HashMap<u64, &Record> = records.iter().map(|r| (r.offset, r)).collect();
    let mut mismatches = Vec::new();

    for (layer, kind, entry) in metadata.entries() {
        let Some(record) = by_offset.get(&entry.offset) else {
            mismatches.push(format!(
                "{layer}/{kind}: no record starts at offset {}",
                entry.offset
            ));
            continue;
        };

        if layer_name(&record.name) != layer || ParamKind::classify(&record.name) != kind {
            mismatches.push(format!(
                "{layer}/{kind}: offset {} holds '{}'",
                entry.offset, record.name
            ));
        }
        if record.shape != entry.shape {
            mismatches.push(format!(
                "{layer}/{kind}: shape {:?} in metadata, {:?} on disk",
                entry.shape, record.shape
            ));
        }
        if record.size() != entry.size {
            mismatches.push(format!(
                "{layer}/{kind}: size {} in metadata, {} on disk",
                entry.size,
                record.size()
            ));
        }
    }

    mismatches
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::metadata::ParamEntry;

    fn record(offset: u64, name: &str, shape: &[usize]) -> Record {
        Record {
            offset,
            name: name.to_string(),
            shape: shape.to_vec(),
            data: vec![0.0; shape.iter().product()],
        }
    }

    fn entry(offset: u64, shape: &[usize]) -> ParamEntry {
        ParamEntry {
            shape: shape.to_vec(),
            offset,
            size: shape.iter().product(),
        }
    }

    #[test]
    fn test_consistent_metadata_has_no_mismatches() {
        let records = vec![record(4, "fc/W", &[2, 2]), record(36, "fc/b", &[2])];
        let mut meta = ModelMetadata::new();
        meta.record("fc/W", entry(4, &[2, 2]));
        meta.record("fc/b", entry(36, &[2]));

        assert!(verify(&records, &meta).is_empty());
    }

    #[test]
    fn test_reports_dangling_offset() {
        let records = vec![record(4, "fc/W", &[2])];
        let mut meta = ModelMetadata::new();
        meta.record("fc/W", entry(8, &[2]));

        let mismatches = verify(&records, &meta);
        assert_eq!(mismatches.len(), 1);
        assert!(mismatches[0].contains("no record starts at offset 8"));
    }

    #[test]
    fn test_reports_shape_and_name_disagreement() {
        let records = vec![record(4, "other/b", &[3])];
        let mut meta = ModelMetadata::new();
        meta.record("fc/W", entry(4, &[2]));

        let mismatches = verify(&records, &meta);
        assert_eq!(mismatches.len(), 3);
        assert!(mismatches[0].contains("holds 'other/b'"));
    }

    #[test]
    fn test_execute_reads_converted_files() {
        use crate::application::convert_use_case::write_weights;
        use crate::data::npy::test_support::f32_npy;
        use crate::data::npz::{test_support::write_npz, NpzArchive};
        use crate::infra::metadata_store::save_metadata;

        let dir = tempfile::tempdir().unwrap();
        let npz = dir.path().join("m.npz");
        let bin = dir.path().join("m.bin");
        let json = dir.path().join("m.json");
        write_npz(
            &npz,
            &[
                ("fc/W", f32_npy(&[2, 3], &[1.0; 6])),
                ("fc/b", f32_npy(&[3], &[0.5; 3])),
            ],
            true,
        );
        let mut archive = NpzArchive::open(&npz).unwrap();
        let (meta, _) = write_weights(&mut archive, &bin).unwrap();
        save_metadata(&json, &meta).unwrap();

        let report = InspectUseCase::new(bin, Some(json)).execute().unwrap();
        assert_eq!(report.records.len(), 2);
        assert_eq!(report.layers, Some(1));
        assert!(report.is_consistent());
    }
}
