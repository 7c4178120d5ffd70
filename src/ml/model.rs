// ============================================================
// Layer 5 — Random Forest Regressor
// ============================================================
// An ensemble of CART regression trees (ml::tree), each grown on a
// bootstrap resample of the training rows. The prediction is the
// mean of the individual tree predictions.
//
// Determinism:
//   A ChaCha8 RNG seeded from `ForestConfig::seed` draws one seed per
//   tree up front. Each tree then owns its RNG, so fitting the trees
//   in parallel with rayon yields the same forest on every run.
//
// Reference: Breiman (2001) Random Forests
//            rayon crate documentation

use ndarray::{Array2, ArrayView1};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::ml::error::ModelError;
use crate::ml::tree::{RegressionTree, TreeParams};

/// How many features each split may look at
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MaxFeatures {
    All,
    Sqrt,
    Fraction(f64),
}

impl MaxFeatures {
    pub fn resolve(self, n_features: usize) -> usize {
        let n = match self {
            MaxFeatures::All         => n_features,
            MaxFeatures::Sqrt        => (n_features as f64).sqrt().floor() as usize,
            MaxFeatures::Fraction(f) => ((n_features as f64) * f).floor() as usize,
        };
        n.clamp(1, n_features.max(1))
    }
}

/// Forest hyperparameters. Tunable, not structural.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestConfig {
    pub n_trees:           usize,
    pub seed:              u64,
    pub max_depth:         Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf:  usize,
    pub max_features:      MaxFeatures,
    pub bootstrap:         bool,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees:           100,
            seed:              42,
            max_depth:         None,
            min_samples_split: 2,
            min_samples_leaf:  1,
            max_features:      MaxFeatures::All,
            bootstrap:         true,
        }
    }
}

impl ForestConfig {
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.n_trees == 0 {
            return Err(ModelError::InvalidConfig("n_trees must be at least 1".into()));
        }
        if self.min_samples_split < 2 {
            return Err(ModelError::InvalidConfig("min_samples_split must be at least 2".into()));
        }
        if self.min_samples_leaf < 1 {
            return Err(ModelError::InvalidConfig("min_samples_leaf must be at least 1".into()));
        }
        if self.max_depth == Some(0) {
            return Err(ModelError::InvalidConfig("max_depth must be at least 1".into()));
        }
        if let MaxFeatures::Fraction(f) = self.max_features {
            if !(f > 0.0 && f <= 1.0) {
                return Err(ModelError::InvalidConfig(format!(
                    "max_features fraction must be in (0, 1], got {f}"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestRegressor {
    config:     ForestConfig,
    n_features: usize,
    trees:      Vec<RegressionTree>,
}

impl RandomForestRegressor {
    pub fn fit(config: &ForestConfig, x: &Array2<f64>, y: &[f64]) -> Result<Self, ModelError> {
        config.validate()?;

        let n = x.nrows();
        if n == 0 {
            return Err(ModelError::EmptyTrainingSet);
        }
        if n != y.len() {
            return Err(ModelError::LengthMismatch { rows: n, targets: y.len() });
        }

        let params = TreeParams {
            max_depth:         config.max_depth,
            min_samples_split: config.min_samples_split,
            min_samples_leaf:  config.min_samples_leaf,
            max_features:      config.max_features.resolve(x.ncols()),
        };

        let mut seeder = ChaCha8Rng::seed_from_u64(config.seed);
        let tree_seeds: Vec<u64> = (0..config.n_trees).map(|_| seeder.gen()).collect();

        let trees: Vec<RegressionTree> = tree_seeds
            .par_iter()
            .map(|&seed| {
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                let samples: Vec<usize> = if config.bootstrap {
                    (0..n).map(|_| rng.gen_range(0..n)).collect()
                } else {
                    (0..n).collect()
                };
                RegressionTree::fit(x, y, samples, &params, rng)
            })
            .collect();

        tracing::debug!(
            "Fitted {} trees on {} rows x {} features (mean depth {:.1})",
            trees.len(),
            n,
            x.ncols(),
            trees.iter().map(|t| t.depth() as f64).sum::<f64>() / trees.len() as f64,
        );

        Ok(Self { config: config.clone(), n_features: x.ncols(), trees })
    }

    pub fn predict_row(&self, row: ArrayView1<'_, f64>) -> Result<f64, ModelError> {
        if row.len() != self.n_features {
            return Err(ModelError::WidthMismatch {
                expected: self.n_features,
                actual:   row.len(),
            });
        }
        let total: f64 = self.trees.iter().map(|t| t.predict(row)).sum();
        Ok(total / self.trees.len() as f64)
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Vec<f64>, ModelError> {
        x.rows().into_iter().map(|row| self.predict_row(row)).collect()
    }

    /// Structural check for a deserialised forest
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.trees.is_empty() {
            return Err(ModelError::CorruptModel("forest has no trees".into()));
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features).map_err(|e| match e {
                ModelError::CorruptModel(msg) => ModelError::CorruptModel(format!("tree {i}: {msg}")),
                other => other,
            })?;
        }
        Ok(())
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn small_config() -> ForestConfig {
        ForestConfig { n_trees: 20, ..ForestConfig::default() }
    }

    fn line_data() -> (Array2<f64>, Vec<f64>) {
        let xs: Vec<f64> = (0..40).map(f64::from).collect();
        let x = Array2::from_shape_vec((40, 1), xs.clone()).unwrap();
        let y = xs.iter().map(|v| 2.0 * v + 1.0).collect();
        (x, y)
    }

    #[test]
    fn test_resolve_max_features() {
        assert_eq!(MaxFeatures::All.resolve(13), 13);
        assert_eq!(MaxFeatures::Sqrt.resolve(16), 4);
        assert_eq!(MaxFeatures::Fraction(0.5).resolve(13), 6);
        assert_eq!(MaxFeatures::Fraction(0.01).resolve(13), 1);
    }

    #[test]
    fn test_fits_monotone_trend() {
        let (x, y) = line_data();
        let forest = RandomForestRegressor::fit(&small_config(), &x, &y).unwrap();
        assert_eq!(forest.n_trees(), 20);

        let low  = forest.predict_row(array![2.0].view()).unwrap();
        let high = forest.predict_row(array![37.0].view()).unwrap();
        assert!(low < high);
        assert!((high - 75.0).abs() < 6.0, "high = {high}");
    }

    #[test]
    fn test_same_seed_same_forest() {
        let (x, y) = line_data();
        let a = RandomForestRegressor::fit(&small_config(), &x, &y).unwrap();
        let b = RandomForestRegressor::fit(&small_config(), &x, &y).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seed_changes_bootstrap() {
        let (x, y) = line_data();
        let a = RandomForestRegressor::fit(&small_config(), &x, &y).unwrap();
        let b = RandomForestRegressor::fit(&ForestConfig { seed: 7, ..small_config() }, &x, &y).unwrap();
        assert_ne!(a.trees, b.trees);
    }

    #[test]
    fn test_width_mismatch_is_an_error() {
        let (x, y) = line_data();
        let forest = RandomForestRegressor::fit(&small_config(), &x, &y).unwrap();
        let err = forest.predict_row(array![1.0, 2.0].view()).unwrap_err();
        assert_eq!(err, ModelError::WidthMismatch { expected: 1, actual: 2 });
    }

    #[test]
    fn test_rejects_empty_and_misaligned_input() {
        let empty = Array2::<f64>::zeros((0, 3));
        assert_eq!(
            RandomForestRegressor::fit(&small_config(), &empty, &[]).unwrap_err(),
            ModelError::EmptyTrainingSet
        );

        let (x, _) = line_data();
        assert_eq!(
            RandomForestRegressor::fit(&small_config(), &x, &[1.0]).unwrap_err(),
            ModelError::LengthMismatch { rows: 40, targets: 1 }
        );
    }

    #[test]
    fn test_invalid_config() {
        let (x, y) = line_data();
        for cfg in [
            ForestConfig { n_trees: 0, ..ForestConfig::default() },
            ForestConfig { min_samples_leaf: 0, ..ForestConfig::default() },
            ForestConfig { max_depth: Some(0), ..ForestConfig::default() },
            ForestConfig { max_features: MaxFeatures::Fraction(1.5), ..ForestConfig::default() },
        ] {
            assert!(matches!(
                RandomForestRegressor::fit(&cfg, &x, &y),
                Err(ModelError::InvalidConfig(_))
            ));
        }
    }

    #[test]
    fn test_without_bootstrap_every_tree_sees_all_rows() {
        let (x, y) = line_data();
        let cfg = ForestConfig { bootstrap: false, n_trees: 3, ..ForestConfig::default() };
        let forest = RandomForestRegressor::fit(&cfg, &x, &y).unwrap();
        // Fully grown trees on every row reproduce the training targets
        for (i, target) in y.iter().enumerate() {
            let pred = forest.predict_row(x.row(i)).unwrap();
            assert!((pred - target).abs() < 1e-9);
        }
    }

    #[test]
    fn test_validate_accepts_fitted_and_rejects_empty_forest() {
        let (x, y) = line_data();
        let mut forest = RandomForestRegressor::fit(&small_config(), &x, &y).unwrap();
        assert_eq!(forest.validate(), Ok(()));

        forest.trees.clear();
        assert!(matches!(forest.validate(), Err(ModelError::CorruptModel(_))));
    }
}
