// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// File-system concerns shared by the trainer and the predictor:
//
//   artifact.rs — The persisted pipeline
//                 One JSON file holding the fitted preprocessor
//                 and forest plus training metadata. Written
//                 atomically by `train`, read once at startup by
//                 `serve` and `predict`.
//
//   metrics.rs  — Training run log
//                 Appends R², MAE and RMSE of each run to a CSV
//                 file for comparison across runs.
//
// Neither module knows about HTTP or the CLI; swapping files for
// object storage would only touch this layer.
//
// Reference: Rust Book §7 (Modules)
//            Rust Book §9 (Error Handling with anyhow)

/// Versioned single-file pipeline artifact
pub mod artifact;

/// Training metrics CSV logger
pub mod metrics;
