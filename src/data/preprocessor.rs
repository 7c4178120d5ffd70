// ============================================================
// Layer 4 — Column Preprocessor
// ============================================================
// Turns encoded FeatureRows into the dense numeric matrix the
// forest is trained on. Two transformers, fitted on the training
// split only:
//
//   StandardScaler  → the 11 numeric-like columns
//                     x' = (x - mean) / std    (population std)
//                     a constant column keeps scale 1.0
//
//   OneHotEncoder   → Gender, Occupation
//                     one indicator per category seen at fit time,
//                     categories sorted, unknown value → all zeros
//
// Output layout (width = 11 + |genders| + |occupations|):
//
//   [ scaled numeric cols in model order | Gender 1-hot | Occupation 1-hot ]
//
// The fitted state is plain data (serde) and is persisted inside
// the artifact, so serving applies the exact training-time means,
// scales and category lists.
//
// Reference: Rust Book §8 (Collections), ndarray documentation

use std::collections::BTreeSet;

use ndarray::{Array1, Array2, ArrayViewMut1, Axis};
use serde::{Deserialize, Serialize};

use crate::domain::features::{FeatureColumn, FeatureRow};

// ─── StandardScaler ───────────────────────────────────────────────────────────
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub columns: Vec<FeatureColumn>,
    pub means:   Vec<f64>,
    pub scales:  Vec<f64>,
}

impl StandardScaler {
    pub fn fit(rows: &[FeatureRow], columns: Vec<FeatureColumn>) -> Self {
        let n = rows.len() as f64;
        let mut means  = Vec::with_capacity(columns.len());
        let mut scales = Vec::with_capacity(columns.len());

        for &column in &columns {
            if rows.is_empty() {
                means.push(0.0);
                scales.push(1.0);
                continue;
            }

            let mean = rows.iter().map(|r| r.numeric(column)).sum::<f64>() / n;
            let var  = rows
                .iter()
                .map(|r| {
                    let d = r.numeric(column) - mean;
                    d * d
                })
                .sum::<f64>()
                / n;
            let std = var.sqrt();

            means.push(mean);
            scales.push(if std > f64::EPSILON * mean.abs().max(1.0) { std } else { 1.0 });
        }

        Self { columns, means, scales }
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    fn write(&self, row: &FeatureRow, mut out: ArrayViewMut1<'_, f64>) {
        for (i, &column) in self.columns.iter().enumerate() {
            out[i] = (row.numeric(column) - self.means[i]) / self.scales[i];
        }
    }
}

// ─── OneHotEncoder ────────────────────────────────────────────────────────────
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    pub columns:    Vec<FeatureColumn>,
    /// Sorted category list per column, parallel to `columns`
    pub categories: Vec<Vec<String>>,
}

impl OneHotEncoder {
    pub fn fit(rows: &[FeatureRow], columns: Vec<FeatureColumn>) -> Self {
        let categories: Vec<Vec<String>> = columns
            .iter()
            .map(|&column| {
                rows.iter()
                    .filter_map(|r| r.category(column))
                    .map(str::to_string)
                    .collect::<BTreeSet<_>>()
                    .into_iter()
                    .collect::<Vec<String>>()
            })
            .collect();
        Self { columns, categories }
    }

    pub fn width(&self) -> usize {
        self.categories.iter().map(Vec::len).sum()
    }

    /// `out` must be zeroed by the caller
    fn write(&self, row: &FeatureRow, mut out: ArrayViewMut1<'_, f64>) {
        let mut offset = 0;
        for (column, cats) in self.columns.iter().zip(&self.categories) {
            if let Some(value) = row.category(*column) {
                // Unknown categories simply leave the block at zero
                if let Ok(pos) = cats.binary_search_by(|c| c.as_str().cmp(value)) {
                    out[offset + pos] = 1.0;
                }
            }
            offset += cats.len();
        }
    }

    /// Whether `value` was seen for `column` at fit time
    #[cfg(test)]
    pub fn knows(&self, column: FeatureColumn, value: &str) -> bool {
        self.columns
            .iter()
            .position(|c| *c == column)
            .map(|i| self.categories[i].binary_search_by(|c| c.as_str().cmp(value)).is_ok())
            .unwrap_or(false)
    }
}

// ─── Preprocessor ─────────────────────────────────────────────────────────────
/// Fitted scaler + one-hot encoder, applied as one step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preprocessor {
    pub scaler:  StandardScaler,
    pub encoder: OneHotEncoder,
}

impl Preprocessor {
    /// Learn means, scales and category lists from `rows`.
    /// An empty slice yields an identity scaler and no categories.
    pub fn fit(rows: &[FeatureRow]) -> Self {
        let scaler  = StandardScaler::fit(rows, FeatureColumn::numeric().collect());
        let encoder = OneHotEncoder::fit(rows, FeatureColumn::nominal().collect());

        tracing::debug!(
            "Preprocessor fitted: {} scaled columns, {} indicator columns",
            scaler.width(),
            encoder.width()
        );
        Self { scaler, encoder }
    }

    /// Number of output columns
    pub fn width(&self) -> usize {
        self.scaler.width() + self.encoder.width()
    }

    pub fn transform_row(&self, row: &FeatureRow) -> Array1<f64> {
        let mut out = Array1::zeros(self.width());
        self.write(row, out.view_mut());
        out
    }

    pub fn transform(&self, rows: &[FeatureRow]) -> Array2<f64> {
        let mut out = Array2::zeros((rows.len(), self.width()));
        for (dest, row) in out.rows_mut().into_iter().zip(rows) {
            self.write(row, dest);
        }
        out
    }

    /// Consistency check for a deserialised preprocessor: the column
    /// kinds and order this build encodes, one mean and scale per
    /// scaled column, and strictly sorted category lists.
    pub fn validate(&self) -> Result<(), String> {
        let scaler = &self.scaler;
        if !scaler.columns.iter().copied().eq(FeatureColumn::numeric()) {
            return Err(format!("scaler columns {:?} are not the numeric columns", scaler.columns));
        }
        if scaler.means.len() != scaler.columns.len() || scaler.scales.len() != scaler.columns.len() {
            return Err(format!(
                "scaler has {} columns, {} means and {} scales",
                scaler.columns.len(),
                scaler.means.len(),
                scaler.scales.len()
            ));
        }
        if scaler.means.iter().any(|m| !m.is_finite()) {
            return Err("scaler has a non-finite mean".into());
        }
        if scaler.scales.iter().any(|&s| !s.is_finite() || s <= 0.0) {
            return Err("scaler has a non-positive or non-finite scale".into());
        }

        let encoder = &self.encoder;
        if !encoder.columns.iter().copied().eq(FeatureColumn::nominal()) {
            return Err(format!("encoder columns {:?} are not the nominal columns", encoder.columns));
        }
        if encoder.categories.len() != encoder.columns.len() {
            return Err(format!(
                "encoder has {} columns but {} category lists",
                encoder.columns.len(),
                encoder.categories.len()
            ));
        }
        for (column, cats) in encoder.columns.iter().zip(&encoder.categories) {
            if cats.windows(2).any(|w| w[0] >= w[1]) {
                return Err(format!("categories for {column:?} are not strictly sorted"));
            }
        }
        Ok(())
    }

    fn write(&self, row: &FeatureRow, out: ArrayViewMut1<'_, f64>) {
        debug_assert_eq!(out.len(), self.width());
        let (numeric, nominal) = out.split_at(Axis(0), self.scaler.width());
        self.scaler.write(row, numeric);
        self.encoder.write(row, nominal);
    }
}
