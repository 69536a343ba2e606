// ============================================================
// Layer 3 — Parameter Domain Type
// ============================================================
// One named array pulled out of the source archive, already
// cast to f32 and flattened in row-major order.
//
// Names follow the "<layer>/<param>" convention used by the
// Caffe-converted checkpoints, e.g.:
//   conv1_1/W   → layer "conv1_1", weights
//   conv1_1/b   → layer "conv1_1", biases
//   fc8/weights → layer "fc8",     weights
//
// The classification rule is deliberately literal:
//   - ends with "/W" or "/weights" → weights
//   - anything else                → biases
// A name with no '/' at all is its own layer name.

use serde::{Deserialize, Serialize};

/// Which slot of a layer a parameter is filed under in the metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    Weights,
    Biases,
}

impl ParamKind {
    /// Classify a parameter by its name suffix.
    pub fn classify(name: &str) -> Self {
        if name.ends_with("/W") || name.ends_with("/weights") {
            ParamKind::Weights
        } else {
            ParamKind::Biases
        }
    }

    /// The JSON key used for this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamKind::Weights => "weights",
            ParamKind::Biases => "biases",
        }
    }
}

impl std::fmt::Display for ParamKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Layer grouping key: everything before the first '/'.
///
/// Example:
///   layer_name("conv1_1/W") == "conv1_1"
///   layer_name("scale")     == "scale"
///   layer_name("/W")        == ""
pub fn layer_name(name: &str) -> &str {
    name.split_once('/').map_or(name, |(layer, _)| layer)
}

/// A named multi-dimensional array of f32 values.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    /// Full member name inside the archive, e.g. "conv1_1/W"
    pub name: String,

    /// Dimension sizes, outermost first. Empty for a scalar.
    pub shape: Vec<usize>,

    /// Flattened values in row-major (C) order
    pub data: Vec<f32>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, shape: Vec<usize>, data: Vec<f32>) -> Self {
        Self {
            name: name.into(),
            shape,
            data,
        }
    }

    /// Total element count: the product of the shape.
    /// A rank-0 scalar has size 1, any zero dimension gives 0.
    pub fn size(&self) -> usize {
        self.shape.iter().product()
    }

    pub fn layer_name(&self) -> &str {
        layer_name(&self.name)
    }

    pub fn kind(&self) -> ParamKind {
        ParamKind::classify(&self.name)
    }
}
