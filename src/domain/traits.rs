// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The application layer talks to these traits, not to concrete
// loaders or stores, so a database-backed source or an object
// storage artifact store can replace the file-based ones without
// touching the use cases.
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;

use crate::domain::record::RawRecord;

// ─── LabelledRecord ───────────────────────────────────────────────────────────
/// A training example: the raw input plus its Quality of Sleep score.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelledRecord {
    pub record: RawRecord,
    pub target: f64,
}

// ─── RecordSource ─────────────────────────────────────────────────────────────
/// Any component that can supply labelled training records.
///
/// Implementations:
///   - CsvLoader → reads the sleep health CSV export
pub trait RecordSource {
    fn load_all(&self) -> Result<Vec<LabelledRecord>>;
}

// ─── SleepScorer ──────────────────────────────────────────────────────────────
/// Any component that can score a single raw record.
///
/// Implementations:
///   - PredictorService → runs the persisted pipeline
pub trait SleepScorer {
    type Error;

    fn score(&self, record: &RawRecord) -> std::result::Result<f64, Self::Error>;
}

// ─── Persistable ──────────────────────────────────────────────────────────────
/// Any component whose state can be saved and restored from disk.
///
/// Implementations:
///   - Artifact → the fitted pipeline plus its training metadata
pub trait Persistable: Sized {
    fn save(&self, path: &str) -> Result<()>;

    fn load(path: &str) -> Result<Self>;
}
