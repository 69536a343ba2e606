// ============================================================
// Layer 4 — Archive Decoding
// ============================================================
// Turns a NumPy .npz file into Parameters:
//
//   vgg16.npz (zip)
//       │
//       ▼
//   NpzArchive      → lists members in archive order,
//       │             decompresses one member at a time
//       ▼
//   npy::decode     → npyz reads the .npy stream, every
//       │             element is cast to f32, Fortran arrays
//       │             are walked row-major through ndarray
//       ▼
//   Parameter       → name + shape + row-major f32 data
//
// Nothing in this layer writes files.

/// Decodes single .npy payloads
pub mod npy;

/// Reads .npz archives and implements ParameterSource
pub mod npz;
