// ============================================================
// Layer 4 — NPZ Archive Loader
// ============================================================
// An .npz file is a ZIP archive whose members are .npy files:
//
//   vgg16.npz
//     ├── conv1_1/W.npy
//     ├── conv1_1/b.npy
//     ├── conv1_2/W.npy
//     └── ...
//
// Member names are the zip entry names with ".npy" stripped,
// in central-directory order. That is the order numpy reports
// through `NpzFile.files`, and it is NOT sorted.
//
// npyz's own archive wrapper lists names through a hash map, so
// the listing is done here with zip's index order, and npyz only
// decodes each member's stream. Members are decompressed one at
// a time on demand.

use anyhow::{bail, Context, Result};
use npyz::npz::array_name_from_file_name;
use std::{
    collections::HashMap,
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};
use zip::ZipArchive;

use crate::data::npy;
use crate::domain::parameter::Parameter;
use crate::domain::traits::ParameterSource;

/// A NumPy .npz archive opened for reading.
/// Implements the ParameterSource trait from Layer 3.
pub struct NpzArchive {
    path: PathBuf,
    archive: ZipArchive<BufReader<File>>,
    /// Array names in archive order
    names: Vec<String>,
    /// Array name → zip entry index
    index: HashMap<String, usize>,
}

impl NpzArchive {
    /// Open an archive and list its members without decompressing them.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)
            .with_context(|| format!("Cannot open archive '{}'", path.display()))?;
        let mut archive = ZipArchive::new(BufReader::new(file))
            .with_context(|| format!("'{}' is not a valid .npz (zip) archive", path.display()))?;

        let mut names = Vec::with_capacity(archive.len());
        let mut index = HashMap::with_capacity(archive.len());

        for i in 0..archive.len() {
            let entry = archive
                .by_index_raw(i)
                .with_context(|| format!("Cannot read entry {i} of '{}'", path.display()))?;
            let file_name = entry.name().to_string();

            let Some(name) = array_name_from_file_name(&file_name) else {
                bail!(
                    "Member '{}' of '{}' is not a .npy array",
                    file_name,
                    path.display()
                );
            };

            index.insert(name.to_string(), i);
            names.push(name.to_string());
        }

        tracing::debug!("Opened '{}' with {} members", path.display(), names.len());
        Ok(Self {
            path,
            archive,
            names,
            index,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl ParameterSource for NpzArchive {
    fn names(&self) -> &[String] {
        &self.names
    }

    fn load(&mut self, name: &str) -> Result<Parameter> {
        let Some(&i) = self.index.get(name) else {
            bail!("No member '{}' in '{}'", name, self.path.display());
        };

        let entry = self
            .archive
            .by_index(i)
            .with_context(|| format!("Cannot open member '{name}'"))?;

        let param = npy::decode(name, entry)
            .with_context(|| format!("Cannot decode member '{name}'"))?;
        Ok(param)
    }
}
