// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Everything that touches the disk or the network:
//
//   fetcher.rs        — Downloads the source archive if it is
//                       not on disk yet (reqwest, blocking).
//
//   weight_writer.rs  — Writes the flat binary weight file and
//                       reports the byte offset of each record.
//
//   weight_reader.rs  — Reads that binary file back, the way a
//                       consuming runtime would.
//
//   metadata_store.rs — Saves and loads the JSON sidecar.
//
// Progress goes through tracing; only Layer 1 prints.

/// Source archive download
pub mod fetcher;

/// Binary weight file writer
pub mod weight_writer;

/// Binary weight file reader
pub mod weight_reader;

/// JSON metadata persistence
pub mod metadata_store;
