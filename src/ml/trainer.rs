// ============================================================
// Layer 5 — Training Run
// ============================================================
// Fits the full pipeline on the training split, then scores the
// hold-out split.
//
//   train split ──► SleepPipeline::fit ──► fitted pipeline
//   test split  ──► predict_many ──► R² / MAE / RMSE
//
// There are no epochs: a forest is fitted in a single pass. The
// hold-out metrics are diagnostics only; a poor R² does not fail
// the run.
//
// Reference: Breiman (2001) Random Forests

use anyhow::{Context, Result};

use crate::data::dataset::SleepDataset;
use crate::ml::evaluation::EvaluationReport;
use crate::ml::model::ForestConfig;
use crate::ml::pipeline::SleepPipeline;

/// What a training run produces
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub pipeline: SleepPipeline,
    /// `None` when the hold-out split is empty
    pub report:   Option<EvaluationReport>,
}

pub fn run_training(
    config: &ForestConfig,
    train:  &SleepDataset,
    test:   &SleepDataset,
) -> Result<TrainingOutcome> {
    // ── Fit ───────────────────────────────────────────────────────────────────
    tracing::info!(
        "Fitting {} trees (seed {}) on {} rows",
        config.n_trees,
        config.seed,
        train.len()
    );
    let pipeline = SleepPipeline::fit(train.rows(), train.targets(), config)
        .context("Failed to fit the sleep quality pipeline")?;
    tracing::info!(
        "Pipeline fitted: {} input columns after preprocessing",
        pipeline.preprocessor.width()
    );

    // ── Evaluate on the hold-out ──────────────────────────────────────────────
    if test.is_empty() {
        tracing::warn!("Hold-out split is empty, skipping evaluation");
        return Ok(TrainingOutcome { pipeline, report: None });
    }

    let predictions = pipeline
        .predict_many(test.rows())
        .context("Failed to score the hold-out split")?;
    let report = EvaluationReport::compute(test.targets(), &predictions);

    if let Some(r) = &report {
        tracing::info!(
            "Hold-out ({} rows): R²={:.4} | MAE={:.4} | RMSE={:.4}",
            r.rows, r.r2, r.mae, r.rmse
        );
    }

    Ok(TrainingOutcome { pipeline, report })
}
