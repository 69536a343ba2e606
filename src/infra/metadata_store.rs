// ============================================================
// Layer 6 — Metadata Store
// ============================================================
// Saves and loads the JSON sidecar that describes where each
// layer's weights and biases live in the binary file.
//
// serde_json::to_string_pretty indents with two spaces, which is
// the layout downstream loaders already expect.

use anyhow::{Context, Result};
use std::{fs, path::Path};

use crate::domain::metadata::ModelMetadata;

/// Write metadata as indented JSON, overwriting any existing file.
pub fn save_metadata(path: impl AsRef<Path>, metadata: &ModelMetadata) -> Result<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(metadata)?;

    fs::write(path, json)
        .with_context(|| format!("Cannot write metadata to '{}'", path.display()))?;

    tracing::debug!(
        "Saved metadata for {} layers to '{}'",
        metadata.len(),
        path.display()
    );
    Ok(())
}

pub fn load_metadata(path: impl AsRef<Path>) -> Result<ModelMetadata> {
    let path = path.as_ref();
    let json = fs::read_to_string(path)
        .with_context(|| format!("Cannot read metadata from '{}'", path.display()))?;

    serde_json::from_str(&json)
        .with_context(|| format!("'{}' is not valid weight metadata", path.display()))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::metadata::ParamEntry;

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meta.json");

        let mut meta = ModelMetadata::new();
        meta.record(
            "fc6/W",
            ParamEntry {
                shape: vec![4, 2],
                offset: 4,
                size: 8,
            },
        );
        save_metadata(&path, &meta).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("{\n  \"fc6\": {\n    \"weights\": {"));
        assert_eq!(load_metadata(&path).unwrap(), meta);
    }

    #[test]
    fn test_load_rejects_wrong_shape() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meta.json");
        fs::write(&path, r#"{"fc6": {"kernels": {"shape": [1], "offset": 4, "size": 1}}}"#)
            .unwrap();
        assert!(load_metadata(&path).is_err());
    }
}
