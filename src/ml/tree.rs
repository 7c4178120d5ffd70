// ============================================================
// Layer 5 — Regression Tree (CART)
// ============================================================
// A binary decision tree minimising squared error.
//
// Growing a node:
//   1. Leaf value = mean target of the samples reaching it
//   2. Stop if too few samples, max depth reached, or all targets
//      are equal (nothing left to explain)
//   3. Otherwise try `max_features` randomly ordered features; for
//      each, sort samples by value and sweep every boundary between
//      two distinct values, keeping the split that maximises
//
//          S_left² / n_left + S_right² / n_right
//
//      (equivalent to the largest reduction in sum of squared error)
//   4. Threshold = midpoint of the two neighbouring values;
//      `x <= threshold` goes left
//
// Nodes live in a flat Vec (root at index 0) so the fitted tree
// serialises as plain data and prediction is a simple loop.
//
// Reference: Breiman et al. (1984) Classification and Regression Trees

use ndarray::{Array2, ArrayView1};
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::ml::error::ModelError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    Leaf {
        value:   f64,
        samples: usize,
    },
    Split {
        feature:   usize,
        threshold: f64,
        left:      usize,
        right:     usize,
    },
}

/// Growth limits for a single tree
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeParams {
    pub max_depth:         Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf:  usize,
    /// Features examined per split, already resolved to a count
    pub max_features:      usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    nodes:      Vec<Node>,
    n_features: usize,
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    feature:   usize,
    threshold: f64,
    score:     f64,
}

struct Grower<'a> {
    x:      &'a Array2<f64>,
    y:      &'a [f64],
    params: &'a TreeParams,
    rng:    ChaCha8Rng,
    nodes:  Vec<Node>,
}

impl RegressionTree {
    /// Fit on the rows of `x` listed in `samples` (duplicates allowed,
    /// which is how bootstrap resampling is expressed).
    pub fn fit(
        x:       &Array2<f64>,
        y:       &[f64],
        samples: Vec<usize>,
        params:  &TreeParams,
        rng:     ChaCha8Rng,
    ) -> Self {
        let mut grower = Grower { x, y, params, rng, nodes: Vec::new() };
        if samples.is_empty() {
            grower.nodes.push(Node::Leaf { value: 0.0, samples: 0 });
        } else {
            grower.grow(samples, 0);
        }
        Self { nodes: grower.nodes, n_features: x.ncols() }
    }

    pub fn predict(&self, row: ArrayView1<'_, f64>) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { value, .. } => return *value,
                Node::Split { feature, threshold, left, right } => {
                    idx = if row[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }

    /// Structural check for a deserialised tree. Children must come
    /// after their parent, so every walk from the root terminates.
    pub fn validate(&self, n_features: usize) -> Result<(), ModelError> {
        let corrupt = |msg: String| -> Result<(), ModelError> { Err(ModelError::CorruptModel(msg)) };

        if self.nodes.is_empty() {
            return corrupt("tree has no nodes".into());
        }
        if self.n_features != n_features {
            return corrupt(format!(
                "tree expects {} features, forest has {}",
                self.n_features, n_features
            ));
        }

        let len = self.nodes.len();
        for (idx, node) in self.nodes.iter().enumerate() {
            match *node {
                Node::Leaf { value, .. } if !value.is_finite() => {
                    return corrupt(format!("leaf {idx} has non-finite value {value}"));
                }
                Node::Leaf { .. } => {}
                Node::Split { feature, threshold, left, right } => {
                    if feature >= n_features {
                        return corrupt(format!("node {idx} splits on feature {feature} of {n_features}"));
                    }
                    if !threshold.is_finite() {
                        return corrupt(format!("node {idx} has non-finite threshold {threshold}"));
                    }
                    for child in [left, right] {
                        if child <= idx || child >= len {
                            return corrupt(format!("node {idx} points at node {child} of {len}"));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    #[cfg(test)]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], idx: usize) -> usize {
            match &nodes[idx] {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + walk(nodes, *left).max(walk(nodes, *right)),
            }
        }
        walk(&self.nodes, 0)
    }
}

impl Grower<'_> {
    fn grow(&mut self, samples: Vec<usize>, depth: usize) -> usize {
        let n   = samples.len();
        let sum: f64 = samples.iter().map(|&i| self.y[i]).sum();

        let node_id = self.nodes.len();
        self.nodes.push(Node::Leaf { value: sum / n as f64, samples: n });

        if !self.can_split(&samples, depth) {
            return node_id;
        }
        let Some(best) = self.best_split(&samples, sum) else {
            return node_id;
        };

        let x = self.x;
        let (left, right): (Vec<usize>, Vec<usize>) = samples
            .into_iter()
            .partition(|&i| x[[i, best.feature]] <= best.threshold);

        let left  = self.grow(left, depth + 1);
        let right = self.grow(right, depth + 1);
        self.nodes[node_id] = Node::Split {
            feature:   best.feature,
            threshold: best.threshold,
            left,
            right,
        };
        node_id
    }

    fn can_split(&self, samples: &[usize], depth: usize) -> bool {
        let n = samples.len();
        if n < self.params.min_samples_split.max(2) || n < 2 * self.params.min_samples_leaf.max(1) {
            return false;
        }
        if self.params.max_depth.is_some_and(|max| depth >= max) {
            return false;
        }
        let first = self.y[samples[0]];
        samples.iter().any(|&i| self.y[i] != first)
    }

    fn best_split(&mut self, samples: &[usize], total: f64) -> Option<Candidate> {
        let n        = samples.len();
        let min_leaf = self.params.min_samples_leaf.max(1);
        let parent   = total * total / n as f64;

        let mut features: Vec<usize> = (0..self.x.ncols()).collect();
        features.shuffle(&mut self.rng);
        features.truncate(self.params.max_features.clamp(1, self.x.ncols().max(1)));

        let x = self.x;
        let y = self.y;
        let mut order = samples.to_vec();
        let mut best: Option<Candidate> = None;

        for feature in features {
            order.sort_by(|&a, &b| x[[a, feature]].total_cmp(&x[[b, feature]]));

            let mut left_sum = 0.0;
            for pos in 0..n - 1 {
                left_sum += y[order[pos]];

                let left_n  = pos + 1;
                let right_n = n - left_n;
                if left_n < min_leaf || right_n < min_leaf {
                    continue;
                }

                let here = x[[order[pos], feature]];
                let next = x[[order[pos + 1], feature]];
                if here >= next {
                    continue;
                }

                let right_sum = total - left_sum;
                let score = left_sum * left_sum / left_n as f64
                    + right_sum * right_sum / right_n as f64;

                if best.map_or(true, |b| score > b.score) {
                    let mut threshold = here + (next - here) / 2.0;
                    if threshold >= next {
                        threshold = here;
                    }
                    best = Some(Candidate { feature, threshold, score });
                }
            }
        }

        // A split must actually reduce the squared error
        best.filter(|b| b.score > parent + 1e-12 * parent.abs().max(1.0))
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rand::SeedableRng;

    fn params() -> TreeParams {
        TreeParams {
            max_depth:         None,
            min_samples_split: 2,
            min_samples_leaf:  1,
            max_features:      usize::MAX,
        }
    }

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(42)
    }

    #[test]
    fn test_step_function_is_learned_exactly() {
        let x = array![[1.0], [2.0], [3.0], [10.0], [11.0], [12.0]];
        let y = [5.0, 5.0, 5.0, 9.0, 9.0, 9.0];
        let tree = RegressionTree::fit(&x, &y, (0..6).collect(), &params(), rng());

        assert_eq!(tree.depth(), 1);
        assert_eq!(tree.predict(array![2.5].view()), 5.0);
        assert_eq!(tree.predict(array![11.5].view()), 9.0);
        // Midpoint threshold between 3 and 10
        assert_eq!(tree.predict(array![6.5].view()), 5.0);
        assert_eq!(tree.predict(array![6.6].view()), 9.0);
    }

    #[test]
    fn test_picks_informative_feature() {
        // Feature 0 is noise, feature 1 determines the target
        let x = array![[3.0, 0.0], [1.0, 0.0], [2.0, 1.0], [0.0, 1.0]];
        let y = [1.0, 1.0, 4.0, 4.0];
        let tree = RegressionTree::fit(&x, &y, (0..4).collect(), &params(), rng());

        match &tree.nodes[0] {
            Node::Split { feature, .. } => assert_eq!(*feature, 1),
            other => panic!("expected a split at the root, got {other:?}"),
        }
    }

    #[test]
    fn test_constant_target_is_single_leaf() {
        let x = array![[1.0], [2.0], [3.0]];
        let y = [7.0, 7.0, 7.0];
        let tree = RegressionTree::fit(&x, &y, vec![0, 1, 2], &params(), rng());
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.predict(array![100.0].view()), 7.0);
    }

    #[test]
    fn test_identical_features_cannot_split() {
        let x = array![[1.0], [1.0], [1.0]];
        let y = [1.0, 2.0, 3.0];
        let tree = RegressionTree::fit(&x, &y, vec![0, 1, 2], &params(), rng());
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.predict(array![1.0].view()), 2.0);
    }

    #[test]
    fn test_max_depth_is_respected() {
        let x = array![[1.0], [2.0], [3.0], [4.0], [5.0], [6.0], [7.0], [8.0]];
        let y = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let p = TreeParams { max_depth: Some(2), ..params() };
        let tree = RegressionTree::fit(&x, &y, (0..8).collect(), &p, rng());
        assert!(tree.depth() <= 2);
    }

    #[test]
    fn test_min_samples_leaf_is_respected() {
        let x = array![[1.0], [2.0], [3.0], [4.0]];
        let y = [0.0, 0.0, 0.0, 10.0];
        let p = TreeParams { min_samples_leaf: 2, ..params() };
        let tree = RegressionTree::fit(&x, &y, (0..4).collect(), &p, rng());
        for node in &tree.nodes {
            if let Node::Leaf { samples, .. } = node {
                assert!(*samples >= 2);
            }
        }
    }

    #[test]
    fn test_duplicate_samples_weight_the_mean() {
        let x = array![[1.0], [1.0]];
        let y = [2.0, 8.0];
        // Row 0 drawn three times, row 1 once → mean 3.5
        let tree = RegressionTree::fit(&x, &y, vec![0, 0, 0, 1], &params(), rng());
        assert_eq!(tree.predict(array![1.0].view()), 3.5);
    }

    #[test]
    fn test_fitted_tree_passes_validation() {
        let x = array![[1.0, 0.0], [2.0, 1.0], [3.0, 0.0], [10.0, 1.0], [11.0, 0.0]];
        let y = [5.0, 5.5, 5.0, 9.0, 9.5];
        let tree = RegressionTree::fit(&x, &y, (0..5).collect(), &params(), rng());
        assert!(tree.node_count() > 1);
        assert_eq!(tree.validate(2), Ok(()));
    }

    #[test]
    fn test_validate_rejects_cycles_and_bad_indices() {
        let x = array![[1.0], [2.0], [10.0], [11.0]];
        let y = [5.0, 5.0, 9.0, 9.0];
        let fitted = RegressionTree::fit(&x, &y, (0..4).collect(), &params(), rng());

        let corrupt_root = |node: Node| {
            let mut tree = fitted.clone();
            tree.nodes[0] = node;
            tree
        };

        for tree in [
            // Root pointing at itself would never reach a leaf
            corrupt_root(Node::Split { feature: 0, threshold: 1e300, left: 0, right: 0 }),
            corrupt_root(Node::Split { feature: 0, threshold: 5.0, left: 1, right: 99 }),
            corrupt_root(Node::Split { feature: 3, threshold: 5.0, left: 1, right: 2 }),
            corrupt_root(Node::Split { feature: 0, threshold: f64::NAN, left: 1, right: 2 }),
            corrupt_root(Node::Leaf { value: f64::INFINITY, samples: 4 }),
            RegressionTree { nodes: Vec::new(), n_features: 1 },
        ] {
            assert!(
                matches!(tree.validate(1), Err(ModelError::CorruptModel(_))),
                "{tree:?}"
            );
        }

        assert!(matches!(fitted.validate(2), Err(ModelError::CorruptModel(_))));
    }
}
