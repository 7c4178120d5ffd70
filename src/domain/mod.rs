// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Pure Rust structs, enums and traits describing a person's
// health / lifestyle snapshot and how it becomes a model input.
//
// Rules for this layer:
//   - NO HTTP types, NO file I/O
//   - NO model fitting code
//   - Only plain data, the encoding contract, and traits
//
// The encoding module is the single source of truth for:
//   - field names accepted from CSV rows and JSON bodies
//   - the BMI and Sleep Disorder vocabularies
//   - the blood pressure "S/D" decomposition
//   - the ordered list of 13 feature columns
//
// Both the trainer and the predictor go through
// `encoding::encode_record`, so the two can never drift apart.
//
// Reference: Rust Book §5 (Structs), §6 (Enums), §10 (Traits)

/// Raw, not-yet-validated input records
pub mod record;

/// The encoded 13-column feature row and its column catalogue
pub mod features;

/// Field names, vocabularies and the encoder itself
pub mod encoding;

/// Client-input error type produced by the encoder
pub mod error;

/// Core abstractions (traits) that other layers implement
pub mod traits;
