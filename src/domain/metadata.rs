// ============================================================
// Layer 3 — Model Metadata
// ============================================================
// The JSON sidecar written next to the binary weight file.
//
// Shape of the document:
//   {
//     "conv1_1": {
//       "weights": { "shape": [3, 3, 3, 64], "offset": 4,    "size": 1728 },
//       "biases":  { "shape": [64],          "offset": 6949, "size": 64   }
//     },
//     ...
//   }
//
// Ordering:
//   Layers and kinds keep first-insertion order, so the JSON
//   follows archive order. IndexMap gives us that for free.
//
// Overwrites:
//   Two members of one layer that classify to the same kind
//   (e.g. "bn/gamma" and "bn/beta" are both "biases") share a
//   slot. The later member wins but the slot keeps its place.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::domain::parameter::{layer_name, ParamKind};

/// Where one parameter lives in the binary file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamEntry {
    /// Dimension sizes as written in the record header
    pub shape: Vec<usize>,

    /// Byte offset of the record's name-length field
    pub offset: u64,

    /// Number of f32 values in the record's payload
    pub size: usize,
}

/// The weights/biases slots of a single layer.
pub type LayerEntry = IndexMap<ParamKind, ParamEntry>;

/// Metadata for a whole converted model, keyed by layer name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelMetadata {
    layers: IndexMap<String, LayerEntry>,
}

impl ModelMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// File a parameter's entry under its layer and kind.
    ///
    /// The layer is created on first use. Returns the entry that
    /// was replaced, if the slot was already taken.
    pub fn record(&mut self, param_name: &str, entry: ParamEntry) -> Option<ParamEntry> {
        let layer = layer_name(param_name).to_string();
        let kind = ParamKind::classify(param_name);

        self.layers.entry(layer).or_default().insert(kind, entry)
    }

    pub fn get(&self, layer: &str, kind: ParamKind) -> Option<&ParamEntry> {
        self.layers.get(layer)?.get(&kind)
    }

    pub fn layer(&self, layer: &str) -> Option<&LayerEntry> {
        self.layers.get(layer)
    }

    /// Layers in insertion order
    pub fn layers(&self) -> impl Iterator<Item = (&str, &LayerEntry)> {
        self.layers.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    /// Every (layer, kind, entry) triple, in insertion order
    pub fn entries(&self) -> impl Iterator<Item = (&str, ParamKind, &ParamEntry)> {
        self.layers.iter().flat_map(|(layer, slots)| {
            slots
                .iter()
                .map(move |(kind, entry)| (layer.as_str(), *kind, entry))
        })
    }

    /// Number of layers
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Number of filled weights/biases slots across all layers
    pub fn entry_count(&self) -> usize {
        self.layers.values().map(|slots| slots.len()).sum()
    }
}
