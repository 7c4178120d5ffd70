// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between the CSV export and the numeric design matrix.
//
// The pipeline flows in this order:
//
//   Sleep_health_and_lifestyle_dataset.csv
//       │
//       ▼
//   CsvLoader          → RawRecord + target per row, Person ID dropped
//       │
//       ▼
//   encode_batch       → FeatureRow per record (domain::encoding)
//       │
//       ▼
//   SleepDataset       → rows paired with Quality of Sleep targets
//       │
//       ▼
//   split_train_test   → seeded shuffle, 80/20 by default
//       │
//       ▼
//   Preprocessor       → scaled numerics + one-hot categoricals
//       │
//       ▼
//   ndarray matrix     → fed to the random forest (Layer 5)
//
// Each module is responsible for exactly one step.
//
// Reference: Rust Book §13 (Iterators and Closures)

/// Loads labelled records from the CSV export
pub mod loader;

/// Encoded rows paired with regression targets
pub mod dataset;

/// Seeded shuffle + train/test split
pub mod splitter;

/// Fitted StandardScaler + OneHotEncoder
pub mod preprocessor;
