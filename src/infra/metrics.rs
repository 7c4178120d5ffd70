// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Appends one row per training run to a CSV file, so successive
// runs (different seeds, tree counts, datasets) can be compared
// side by side.
//
// Columns:
//   timestamp_ms — wall-clock time the run finished
//   train_rows   — rows the pipeline was fitted on
//   test_rows    — rows held out for evaluation
//   n_trees      — forest size
//   seed         — RNG seed for split and forest
//   r2           — coefficient of determination on the hold-out
//   mae          — mean absolute error on the hold-out
//   rmse         — root mean squared error on the hold-out
//
// The three hold-out metrics are left empty when the hold-out
// split was empty.
//
// Example:
//   timestamp_ms,train_rows,test_rows,n_trees,seed,r2,mae,rmse
//   1760000000000,299,75,100,42,0.9571,0.1128,0.2483
//   1760000100000,374,0,100,42,,,
//
// Reference: Rust Book §12 (I/O and File Handling)
//            csv crate documentation

use std::{
    fs::{self, OpenOptions},
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::ml::evaluation::EvaluationReport;

/// One row of the metrics CSV
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetrics {
    pub timestamp_ms: u64,
    pub train_rows:   usize,
    pub test_rows:    usize,
    pub n_trees:      usize,
    pub seed:         u64,
    pub r2:           Option<f64>,
    pub mae:          Option<f64>,
    pub rmse:         Option<f64>,
}

impl RunMetrics {
    pub fn new(
        train_rows: usize,
        test_rows:  usize,
        n_trees:    usize,
        seed:       u64,
        report:     Option<&EvaluationReport>,
    ) -> Self {
        let timestamp_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        Self {
            timestamp_ms,
            train_rows,
            test_rows,
            n_trees,
            seed,
            r2:   report.map(|r| r.r2),
            mae:  report.map(|r| r.mae),
            rmse: report.map(|r| r.rmse),
        }
    }
}

/// Appends run metrics to a CSV file.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Parent directories are created on demand; the header is only
    /// written when the file is new or empty.
    pub fn new(csv_path: impl Into<PathBuf>) -> Result<Self> {
        let csv_path = csv_path.into();
        if let Some(parent) = csv_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Cannot create '{}'", parent.display()))?;
        }
        Ok(Self { csv_path })
    }

    pub fn log(&self, metrics: &RunMetrics) -> Result<()> {
        let is_new = fs::metadata(&self.csv_path).map(|m| m.len() == 0).unwrap_or(true);

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.csv_path)
            .with_context(|| format!("Cannot open metrics CSV '{}'", self.csv_path.display()))?;

        // csv writes the header from the field names on the first
        // serialised row, so only enable it for a fresh file
        let mut writer = csv::WriterBuilder::new().has_headers(is_new).from_writer(file);
        writer.serialize(metrics)?;
        writer.flush()?;

        tracing::debug!(
            "Logged run metrics to '{}': r2={:?}",
            self.csv_path.display(),
            metrics.r2
        );
        Ok(())
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }
}
