// ============================================================
// Layer 4 — Train/Test Splitter
// ============================================================
// Shuffles samples with a seeded RNG and splits off a hold-out set:
//   - Training set: used to fit the scaler, encoder and forest
//   - Test set:     used only to report R², MAE and RMSE
//
// Sizes follow the usual convention:
//   n_test  = ceil(n * test_fraction)
//   n_train = n - n_test
//
// The RNG is ChaCha8 seeded from the training config, so the same
// dataset and seed always produce the same split, and therefore
// the same artifact.
//
// Reference: rand / rand_chacha crate documentation

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Shuffle `samples` deterministically and split into (train, test).
///
/// `test_fraction` is clamped to [0, 1].
pub fn split_train_test<T>(mut samples: Vec<T>, test_fraction: f64, seed: u64) -> (Vec<T>, Vec<T>) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    samples.shuffle(&mut rng);

    let total    = samples.len();
    let fraction = test_fraction.clamp(0.0, 1.0);
    let n_test   = ((total as f64) * fraction).ceil() as usize;
    let split_at = total - n_test.min(total);

    // After this: samples = [0..split_at], test = [split_at..total]
    let test = samples.split_off(split_at);

    tracing::debug!(
        "Dataset split: {} training, {} test (seed {})",
        samples.len(),
        test.len(),
        seed,
    );

    (samples, test)
}
