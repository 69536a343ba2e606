// ============================================================
// Layer 6 — Binary Weight Reader
// ============================================================
// Reads a weight file back using the same layout WeightWriter
// produces. This is what a consuming runtime does at load time,
// and it is how `inspect` and the round-trip tests check output.
//
// Strict: a truncated record, a negative count or dimension, a
// non-UTF-8 name, or bytes after the last record are all errors.

use anyhow::{bail, Context, Result};
use std::{fs, path::Path};

/// One record read back from a weight file.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Byte offset of the record's name-length field
    pub offset: u64,
    pub name: String,
    pub shape: Vec<usize>,
    pub data: Vec<f32>,
}

impl Record {
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Read and parse a whole weight file.
pub fn read_weight_file(path: impl AsRef<Path>) -> Result<Vec<Record>> {
    let path = path.as_ref();
    let bytes = fs::read(path)
        .with_context(|| format!("Cannot read weight file '{}'", path.display()))?;
    parse_weights(&bytes).with_context(|| format!("Invalid weight file '{}'", path.display()))
}

/// Parse an in-memory weight file.
pub fn parse_weights(bytes: &[u8]) -> Result<Vec<Record>> {
    let mut cursor = Cursor { bytes, pos: 0 };

    let count = cursor.read_count("record count")?;
    let mut records = Vec::with_capacity(count.min(4096));

    for i in 0..count {
        let offset = cursor.pos as u64;

        let name_len = cursor.read_count("name length")?;
        let name = std::str::from_utf8(cursor.take(name_len, "name")?)
            .with_context(|| format!("Record {i} name is not valid UTF-8"))?
            .to_string();

        let rank = cursor.read_count("rank")?;
        let mut shape = Vec::with_capacity(rank);
        for _ in 0..rank {
            shape.push(cursor.read_count("dimension")?);
        }

        let size = shape
            .iter()
            .try_fold(1usize, |acc, &dim| acc.checked_mul(dim))
            .with_context(|| format!("Record '{name}' shape {shape:?} overflows"))?;
        let payload = cursor.take(size.saturating_mul(4), "data")?;
        let data = payload
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect();

        records.push(Record {
            offset,
            name,
            shape,
            data,
        });
    }

    if cursor.pos != bytes.len() {
        bail!(
            "{} trailing bytes after record {}",
            bytes.len() - cursor.pos,
            count
        );
    }
    Ok(records)
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn take(&mut self, len: usize, what: &str) -> Result<&'a [u8]> {
        let bytes = self.bytes;
        let end = self.pos.checked_add(len).filter(|&end| end <= bytes.len());
        let Some(end) = end else {
            bail!(
                "truncated {what} at byte {}: need {len}, have {}",
                self.pos,
                bytes.len() - self.pos
            );
        };
        let slice = &bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn read_i32(&mut self, what: &str) -> Result<i32> {
        let raw = self.take(4, what)?;
        Ok(i32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]))
    }

    /// An int32 that must be non-negative
    fn read_count(&mut self, what: &str) -> Result<usize> {
        let at = self.pos;
        let value = self.read_i32(what)?;
        usize::try_from(value).map_err(|_| anyhow::anyhow!("negative {what} {value} at byte {at}"))
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::parameter::Parameter;
    use crate::infra::weight_writer::WeightWriter;

    fn write(params: &[Parameter]) -> Vec<u8> {
        let mut writer = WeightWriter::new(Vec::new());
        writer.write_header(params.len()).unwrap();
        for p in params {
            writer.write_record(p).unwrap();
        }
        writer.finish().unwrap()
    }

    #[test]
    fn test_reads_back_written_records() {
        let params = vec![
            Parameter::new("conv1_1/W", vec![2, 1, 1, 2], vec![0.1, 0.2, 0.3, 0.4]),
            Parameter::new("conv1_1/b", vec![2], vec![-1.0, 1.0]),
            Parameter::new("scale", vec![], vec![2.5]),
        ];
        let records = parse_weights(&write(&params)).unwrap();

        assert_eq!(records.len(), 3);
        for (record, param) in records.iter().zip(&params) {
            assert_eq!(record.name, param.name);
            assert_eq!(record.shape, param.shape);
            assert_eq!(record.data, param.data);
        }
        assert_eq!(records[0].offset, 4);
        assert_eq!(records[1].offset, 4 + 4 + 9 + 4 + 16 + 16);
    }

    #[test]
    fn test_empty_file_has_zero_records() {
        let records = parse_weights(&write(&[])).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_truncated_file_fails() {
        let mut bytes = write(&[Parameter::new("a/b", vec![3], vec![1.0, 2.0, 3.0])]);
        bytes.pop();
        let err = parse_weights(&bytes).unwrap_err();
        assert!(err.to_string().contains("truncated data"));
    }

    #[test]
    fn test_trailing_bytes_fail() {
        let mut bytes = write(&[Parameter::new("a/b", vec![1], vec![1.0])]);
        bytes.extend_from_slice(&[0, 0]);
        assert!(parse_weights(&bytes).is_err());
    }

    #[test]
    fn test_negative_count_fails() {
        let bytes = (-1i32).to_le_bytes();
        let err = parse_weights(&bytes).unwrap_err();
        assert!(err.to_string().contains("negative record count"));
    }
}
