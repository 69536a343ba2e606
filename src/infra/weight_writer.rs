// ============================================================
// Layer 6 — Binary Weight Writer
// ============================================================
// Writes the flat weight file consumed by the inference runtime.
//
// All integers are 4-byte signed little-endian, all values are
// 4-byte IEEE-754 little-endian floats. No padding anywhere.
//
//   int32                  num_records
//   repeat num_records:
//     int32                name_length   (bytes)
//     byte[name_length]    name          (UTF-8)
//     int32                rank
//     int32[rank]          dims
//     float32[prod(dims)]  data          (row-major)
//
// The writer counts every byte it emits, so the caller can ask
// for the current offset without seeking the underlying file.

use anyhow::{anyhow, Context, Result};
use std::io::Write;

use crate::domain::parameter::Parameter;

/// Streams records into any `Write` and tracks the byte position.
pub struct WeightWriter<W: Write> {
    inner: W,
    position: u64,
}

impl<W: Write> WeightWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, position: 0 }
    }

    /// Bytes written so far, i.e. the offset of the next record
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Write the leading record count.
    pub fn write_header(&mut self, num_records: usize) -> Result<()> {
        self.write_i32(num_records, "record count")
    }

    /// Write one record and return the offset it starts at.
    ///
    /// The record is validated in full before its first byte goes
    /// out, so a rejected parameter leaves the stream untouched.
    pub fn write_record(&mut self, param: &Parameter) -> Result<u64> {
        if param.data.len() != param.size() {
            return Err(anyhow!(
                "'{}' has {} values but shape {:?} needs {}",
                param.name,
                param.data.len(),
                param.shape,
                param.size()
            ));
        }

        let name = param.name.as_bytes();
        let name_len = to_i32(name.len(), "name length")?;
        let rank = to_i32(param.shape.len(), "rank")?;
        let dims = param
            .shape
            .iter()
            .map(|&dim| to_i32(dim, "dimension"))
            .collect::<Result<Vec<i32>>>()?;

        let offset = self.position;
        self.write_bytes(&name_len.to_le_bytes())?;
        self.write_bytes(name)?;
        self.write_bytes(&rank.to_le_bytes())?;
        for dim in dims {
            self.write_bytes(&dim.to_le_bytes())?;
        }
        for value in &param.data {
            self.write_bytes(&value.to_le_bytes())?;
        }

        Ok(offset)
    }

    /// Flush and hand back the underlying writer.
    pub fn finish(mut self) -> Result<W> {
        self.inner.flush().context("Cannot flush weight file")?;
        Ok(self.inner)
    }

    fn write_i32(&mut self, value: usize, what: &str) -> Result<()> {
        let value = to_i32(value, what)?;
        self.write_bytes(&value.to_le_bytes())
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.inner.write_all(bytes)?;
        self.position += bytes.len() as u64;
        Ok(())
    }
}

fn to_i32(value: usize, what: &str) -> Result<i32> {
    i32::try_from(value).map_err(|_| anyhow!("{what} {value} does not fit in an int32"))
}

/// Size in bytes of the record `write_record` would produce.
pub fn record_len(param: &Parameter) -> u64 {
    (4 + param.name.len() + 4 + 4 * param.shape.len() + 4 * param.size()) as u64
}
