// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// This layer orchestrates the other layers to accomplish one
// goal each: building an artifact, or answering predictions
// from one.
//
// Rules for this layer:
//   - No ML math here (that's Layer 5)
//   - No HTTP or printing here (that's Layers 1 and 7)
//   - No direct file formats here (that's Layers 4 and 6)
//   - Only workflow coordination
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

/// The training workflow
pub mod train_use_case;

/// The prediction workflow and its model lifecycle
pub mod predict_use_case;
