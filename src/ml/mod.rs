// ============================================================
// Layer 5 — ML / Model Layer
// ============================================================
// Everything that fits or evaluates the regressor lives here.
// The layers above only see `SleepPipeline`, the trainer entry
// point and the Inferencer.
//
// What's in this layer:
//
//   tree.rs       — CART regression tree (squared-error splits)
//
//   model.rs      — Random forest regressor
//                   • bootstrap resampling per tree
//                   • per-split feature subsampling
//                   • seeded, parallel fitting with rayon
//
//   pipeline.rs   — Preprocessor + forest as one fitted,
//                   serialisable unit, with its encoding contract
//
//   evaluation.rs — R², MAE and RMSE on the hold-out split
//
//   trainer.rs    — Fit + evaluate a training run
//
//   inferencer.rs — Panic-safe single-row inference
//
// Reference: Breiman (2001) Random Forests
//            ndarray, rayon crate documentation

/// Errors raised while fitting or running the pipeline
pub mod error;

/// Single regression tree
pub mod tree;

/// Random forest regressor and its configuration
pub mod model;

/// Fitted preprocessor + regressor
pub mod pipeline;

/// Goodness-of-fit metrics
pub mod evaluation;

/// Training run: fit then evaluate
pub mod trainer;

/// Inference engine for a loaded pipeline
pub mod inferencer;
