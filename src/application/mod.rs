// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// This layer strings the other layers together to reach a goal
// (converting an archive, or checking a converted file).
//
// Rules for this layer:
//   - No archive decoding here (that's Layer 4)
//   - No byte-level file formats here (that's Layer 6)
//   - No UI or printing here (that's Layer 1)
//   - Only workflow coordination
//
// Reference: Clean Architecture pattern

// Fetch + convert
pub mod convert_use_case;

// Read back + verify
pub mod inspect_use_case;
