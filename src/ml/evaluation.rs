// ============================================================
// Layer 5 — Evaluation Metrics
// ============================================================
// Hold-out diagnostics reported after training. None of these are
// enforced by a threshold; they are logged and written to the
// metrics CSV so runs can be compared.
//
//   R²   = 1 - SS_res / SS_tot
//   MAE  = mean |y - ŷ|
//   RMSE = sqrt(mean (y - ŷ)²)

use serde::{Deserialize, Serialize};

/// Coefficient of determination.
///
/// A constant `y_true` has SS_tot = 0: a perfect fit scores 1.0,
/// anything else 0.0. Empty input yields NaN.
pub fn r2_score(y_true: &[f64], y_pred: &[f64]) -> f64 {
    debug_assert_eq!(y_true.len(), y_pred.len());
    if y_true.is_empty() {
        return f64::NAN;
    }

    let mean   = y_true.iter().sum::<f64>() / y_true.len() as f64;
    let ss_tot = y_true.iter().map(|y| (y - mean).powi(2)).sum::<f64>();
    let ss_res = y_true
        .iter()
        .zip(y_pred)
        .map(|(y, p)| (y - p).powi(2))
        .sum::<f64>();

    if ss_tot == 0.0 {
        return if ss_res == 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}

pub fn mean_absolute_error(y_true: &[f64], y_pred: &[f64]) -> f64 {
    if y_true.is_empty() {
        return f64::NAN;
    }
    y_true.iter().zip(y_pred).map(|(y, p)| (y - p).abs()).sum::<f64>() / y_true.len() as f64
}

pub fn root_mean_squared_error(y_true: &[f64], y_pred: &[f64]) -> f64 {
    if y_true.is_empty() {
        return f64::NAN;
    }
    let mse = y_true.iter().zip(y_pred).map(|(y, p)| (y - p).powi(2)).sum::<f64>()
        / y_true.len() as f64;
    mse.sqrt()
}

/// Hold-out scores for one training run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub rows: usize,
    pub r2:   f64,
    pub mae:  f64,
    pub rmse: f64,
}

impl EvaluationReport {
    /// `None` when there is nothing to evaluate on
    pub fn compute(y_true: &[f64], y_pred: &[f64]) -> Option<Self> {
        if y_true.is_empty() {
            return None;
        }
        Some(Self {
            rows: y_true.len(),
            r2:   r2_score(y_true, y_pred),
            mae:  mean_absolute_error(y_true, y_pred),
            rmse: root_mean_squared_error(y_true, y_pred),
        })
    }
}
