// ============================================================
// Layer 5 — Sleep Pipeline
// ============================================================
// The fitted unit that gets persisted: preprocessor + forest, plus
// the encoding contract they were fitted under.
//
//   FeatureRow ──► Preprocessor ──► RandomForestRegressor ──► score
//
// `verify_contract` is run by the artifact loader. A pipeline whose
// encoding version or column list disagrees with this build, or
// whose fitted state is internally inconsistent (scaler vectors,
// widths, tree structure), is refused at startup rather than at the
// first request.

use serde::{Deserialize, Serialize};

use crate::data::preprocessor::Preprocessor;
use crate::domain::encoding::ENCODING_VERSION;
use crate::domain::features::{FeatureColumn, FeatureRow};
use crate::ml::error::ModelError;
use crate::ml::model::{ForestConfig, RandomForestRegressor};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleepPipeline {
    pub encoding_version: u32,
    pub feature_columns:  Vec<String>,
    pub preprocessor:     Preprocessor,
    pub regressor:        RandomForestRegressor,
}

impl SleepPipeline {
    /// Fit scaler, encoder and forest on the training rows only.
    pub fn fit(
        rows:    &[FeatureRow],
        targets: &[f64],
        config:  &ForestConfig,
    ) -> Result<Self, ModelError> {
        if rows.is_empty() {
            return Err(ModelError::EmptyTrainingSet);
        }
        if rows.len() != targets.len() {
            return Err(ModelError::LengthMismatch { rows: rows.len(), targets: targets.len() });
        }

        let preprocessor = Preprocessor::fit(rows);
        let x            = preprocessor.transform(rows);
        let regressor    = RandomForestRegressor::fit(config, &x, targets)?;

        Ok(Self {
            encoding_version: ENCODING_VERSION,
            feature_columns:  FeatureColumn::names(),
            preprocessor,
            regressor,
        })
    }

    pub fn predict(&self, row: &FeatureRow) -> Result<f64, ModelError> {
        let x     = self.preprocessor.transform_row(row);
        let score = self.regressor.predict_row(x.view())?;
        if !score.is_finite() {
            return Err(ModelError::NonFinitePrediction(score));
        }
        Ok(score)
    }

    pub fn predict_many(&self, rows: &[FeatureRow]) -> Result<Vec<f64>, ModelError> {
        let x = self.preprocessor.transform(rows);
        self.regressor.predict(&x)
    }

    /// Check that this pipeline can be driven by this build's encoder.
    pub fn verify_contract(&self) -> Result<(), ModelError> {
        if self.encoding_version != ENCODING_VERSION {
            return Err(ModelError::IncompatibleEncoding {
                expected: ENCODING_VERSION,
                found:    self.encoding_version,
            });
        }

        let expected = FeatureColumn::names();
        if self.feature_columns != expected {
            return Err(ModelError::ColumnMismatch {
                expected,
                found: self.feature_columns.clone(),
            });
        }

        self.preprocessor.validate().map_err(ModelError::CorruptModel)?;

        if self.preprocessor.width() != self.regressor.n_features() {
            return Err(ModelError::WidthMismatch {
                expected: self.regressor.n_features(),
                actual:   self.preprocessor.width(),
            });
        }

        self.regressor.validate()
    }
}
