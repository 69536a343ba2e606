// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust types that describe what a converted model IS:
// named parameters, their layer grouping, and the metadata
// that points into the binary weight file.
//
// Rules for this layer:
//   - NO archive decoding (that's Layer 4 - data)
//   - NO file or network I/O (that's Layer 6 - infra)
//   - Only plain structs, enums, and traits
//
// Everything here can be unit tested without touching disk.

// A named array and its layer/kind classification
pub mod parameter;

// Layer → weights/biases → (shape, offset, size) mapping
pub mod metadata;

// Core abstractions (traits) that other layers implement
pub mod traits;
