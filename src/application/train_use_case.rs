// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Load the CSV dataset        (Layer 4 - data)
//   Step 2: Encode every record         (Layer 3 - domain)
//   Step 3: Split train / test          (Layer 4 - data)
//   Step 4: Fit and evaluate            (Layer 5 - ml)
//   Step 5: Save the artifact           (Layer 6 - infra)
//   Step 6: Append the metrics row      (Layer 6 - infra)
//
// Any failure aborts the run with an error; in particular no
// artifact is written unless every earlier step succeeded.
//
// Reference: Rust Book §13 (Iterators and Closures)

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::{dataset::SleepDataset, loader::CsvLoader, splitter::split_train_test};
use crate::domain::encoding::encode_batch;
use crate::domain::traits::{LabelledRecord, Persistable, RecordSource};
use crate::infra::artifact::{Artifact, ArtifactMetadata};
use crate::infra::metrics::{MetricsLogger, RunMetrics};
use crate::ml::evaluation::EvaluationReport;
use crate::ml::model::ForestConfig;
use crate::ml::trainer::run_training;

// ─── Training Configuration ──────────────────────────────────────────────────
// Everything a training run needs. Serialisable so a run can be
// described in (and reproduced from) a JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainConfig {
    pub dataset_path:             String,
    pub artifact_path:            String,
    pub metrics_csv:              Option<String>,
    pub test_fraction:            f64,
    pub n_trees:                  usize,
    pub seed:                     u64,
    pub max_depth:                Option<usize>,
    pub min_samples_leaf:         usize,
    pub default_body_temperature: f64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            dataset_path:             "Sleep_health_and_lifestyle_dataset.csv".to_string(),
            artifact_path:            "sleep_model.json".to_string(),
            metrics_csv:              Some("metrics.csv".to_string()),
            test_fraction:            0.2,
            n_trees:                  100,
            seed:                     42,
            max_depth:                None,
            min_samples_leaf:         1,
            default_body_temperature: 98.6,
        }
    }
}

impl TrainConfig {
    /// Forest hyperparameters derived from this config
    pub fn forest(&self) -> ForestConfig {
        ForestConfig {
            n_trees:          self.n_trees,
            seed:             self.seed,
            max_depth:        self.max_depth,
            min_samples_leaf: self.min_samples_leaf,
            ..ForestConfig::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..1.0).contains(&self.test_fraction) {
            bail!("test fraction must be in [0, 1), got {}", self.test_fraction);
        }
        if !self.default_body_temperature.is_finite() {
            bail!("default body temperature must be a finite number");
        }
        self.forest().validate()?;
        Ok(())
    }
}

/// What `train` reports back to the CLI
#[derive(Debug, Clone, PartialEq)]
pub struct TrainSummary {
    pub train_rows:    usize,
    pub test_rows:     usize,
    pub report:        Option<EvaluationReport>,
    pub artifact_path: String,
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Execute the full training pipeline end to end
    pub fn execute(&self) -> Result<TrainSummary> {
        let cfg = &self.config;
        cfg.validate().context("Invalid training configuration")?;

        // ── Step 1: Load the dataset ──────────────────────────────────────────
        tracing::info!("Loading dataset from '{}'", cfg.dataset_path);
        let loader   = CsvLoader::new(&cfg.dataset_path, cfg.default_body_temperature);
        let labelled = loader.load_all()?;
        if labelled.is_empty() {
            bail!("Dataset '{}' contains no rows", cfg.dataset_path);
        }
        tracing::info!("Loaded {} records", labelled.len());

        // ── Step 2: Encode with the shared encoder ────────────────────────────
        // Same code path the predictor uses for a single request
        let (records, targets): (Vec<_>, Vec<_>) = labelled
            .into_iter()
            .map(|LabelledRecord { record, target }| (record, target))
            .unzip();

        let rows = encode_batch(&records).map_err(|e| {
            let line = e.row + 2;
            anyhow::Error::new(e)
                .context(format!("Dataset '{}' line {line}: cannot encode record", cfg.dataset_path))
        })?;
        let dataset = SleepDataset::new(rows, targets);

        // ── Step 3: Seeded train / test split ─────────────────────────────────
        let (train, test) = split_train_test(dataset.into_samples(), cfg.test_fraction, cfg.seed);
        if train.is_empty() {
            bail!(
                "No training rows left after holding out {:.0}% of the data",
                cfg.test_fraction * 100.0
            );
        }
        let train = SleepDataset::from_samples(train);
        let test  = SleepDataset::from_samples(test);
        tracing::info!("Split: {} train, {} test", train.len(), test.len());

        // ── Step 4: Fit + evaluate (Layer 5) ──────────────────────────────────
        let outcome = run_training(&cfg.forest(), &train, &test)?;

        // ── Step 5: Persist the pipeline ──────────────────────────────────────
        let metadata = ArtifactMetadata::new(
            &outcome.pipeline,
            train.len(),
            test.len(),
            outcome.report.map(|r| r.r2),
        );
        let artifact = Artifact { metadata, pipeline: outcome.pipeline };
        artifact
            .save(&cfg.artifact_path)
            .with_context(|| format!("Failed to save artifact to '{}'", cfg.artifact_path))?;
        tracing::info!("Artifact saved to '{}'", cfg.artifact_path);

        // ── Step 6: Metrics log ───────────────────────────────────────────────
        if let Some(csv) = &cfg.metrics_csv {
            let logger = MetricsLogger::new(csv)?;
            logger.log(&RunMetrics::new(
                train.len(),
                test.len(),
                cfg.n_trees,
                cfg.seed,
                outcome.report.as_ref(),
            ))?;
        }

        Ok(TrainSummary {
            train_rows:    train.len(),
            test_rows:     test.len(),
            report:        outcome.report,
            artifact_path: cfg.artifact_path.clone(),
        })
    }
}
