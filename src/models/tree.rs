use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use super::{check_fit_input, Classifier, ModelError};

// ============================================================================
// DECISION TREE
// ============================================================================

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        /// Fraction of class-1 samples reaching this leaf.
        proba: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// Gini impurity of a binary node with `pos` class-1 samples out of `n`.
fn gini(pos: f64, n: f64) -> f64 {
    if n <= 0.0 {
        return 0.0;
    }
    let p = pos / n;
    2.0 * p * (1.0 - p)
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    /// Weighted child impurity.
    impurity: f64,
}

/// CART classifier with Gini impurity over binary labels.
#[derive(Debug, Clone)]
pub struct DecisionTreeClassifier {
    /// `None` grows until leaves are pure.
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    /// Features examined per split; `None` examines all of them.
    pub max_features: Option<usize>,
    pub seed: u64,
    nodes: Vec<Node>,
    n_features: usize,
    importances: Vec<f64>,
}

impl Default for DecisionTreeClassifier {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            max_features: None,
            seed: 0,
            nodes: Vec::new(),
            n_features: 0,
            importances: Vec::new(),
        }
    }
}

impl DecisionTreeClassifier {
    pub fn new(max_depth: Option<usize>) -> Self {
        Self {
            max_depth,
            ..Self::default()
        }
    }

    pub fn with_max_features(mut self, max_features: Option<usize>) -> Self {
        self.max_features = max_features;
        self
    }

    pub fn is_fitted(&self) -> bool {
        !self.nodes.is_empty()
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Length of the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], i: usize) -> usize {
            match nodes[i] {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + walk(nodes, left).max(walk(nodes, right)),
            }
        }
        if self.nodes.is_empty() {
            0
        } else {
            walk(&self.nodes, 0)
        }
    }

    /// Impurity-decrease importances, normalised to sum to 1 (all zero if the
    /// tree never split).
    pub fn feature_importances(&self) -> &[f64] {
        &self.importances
    }

    /// Fit on the rows listed in `indices` (repeats allowed, as in a
    /// bootstrap sample).
    pub(crate) fn fit_indices<R: Rng>(
        &mut self,
        x: &Array2<f64>,
        y: &Array1<u8>,
        indices: &mut [usize],
        rng: &mut R,
    ) {
        self.nodes.clear();
        self.n_features = x.ncols();
        self.importances = vec![0.0; x.ncols()];

        let total = indices.len() as f64;
        self.grow(x, y, indices, 0, total, rng);

        let sum: f64 = self.importances.iter().sum();
        if sum > 0.0 {
            for imp in &mut self.importances {
                *imp /= sum;
            }
        }
    }

    /// Build the subtree for `indices` and return its node id.
    fn grow<R: Rng>(
        &mut self,
        x: &Array2<f64>,
        y: &Array1<u8>,
        indices: &mut [usize],
        depth: usize,
        total: f64,
        rng: &mut R,
    ) -> usize {
        let n = indices.len() as f64;
        let pos = indices.iter().filter(|&&i| y[i] == 1).count() as f64;
        let impurity = gini(pos, n);

        let id = self.nodes.len();
        self.nodes.push(Node::Leaf {
            proba: if n > 0.0 { pos / n } else { 0.0 },
        });

        let depth_exhausted = self.max_depth.is_some_and(|d| depth >= d);
        if impurity == 0.0 || indices.len() < self.min_samples_split || depth_exhausted {
            return id;
        }

        let Some(best) = self.best_split(x, y, indices, rng) else {
            return id;
        };
        let gain = impurity - best.impurity;
        if gain <= 1e-12 {
            return id;
        }
        self.importances[best.feature] += n / total * gain;

        // Partition in place: rows going left first.
        let mut mid = 0;
        for k in 0..indices.len() {
            if x[[indices[k], best.feature]] <= best.threshold {
                indices.swap(k, mid);
                mid += 1;
            }
        }
        let (left_rows, right_rows) = indices.split_at_mut(mid);

        let left = self.grow(x, y, left_rows, depth + 1, total, rng);
        let right = self.grow(x, y, right_rows, depth + 1, total, rng);
        self.nodes[id] = Node::Split {
            feature: best.feature,
            threshold: best.threshold,
            left,
            right,
        };
        id
    }

    /// Lowest weighted Gini over the candidate features, scanning midpoints
    /// between consecutive distinct values.
    fn best_split<R: Rng>(
        &self,
        x: &Array2<f64>,
        y: &Array1<u8>,
        indices: &[usize],
        rng: &mut R,
    ) -> Option<BestSplit> {
        let mut features: Vec<usize> = (0..x.ncols()).collect();
        if let Some(k) = self.max_features {
            features.shuffle(rng);
            features.truncate(k.clamp(1, x.ncols()));
        }

        let n = indices.len() as f64;
        let total_pos = indices.iter().filter(|&&i| y[i] == 1).count() as f64;
        let mut best: Option<BestSplit> = None;

        let mut order: Vec<usize> = indices.to_vec();
        for &f in &features {
            order.sort_by(|&a, &b| x[[a, f]].total_cmp(&x[[b, f]]));

            let mut left_n = 0.0;
            let mut left_pos = 0.0;
            for k in 0..order.len() - 1 {
                let row = order[k];
                left_n += 1.0;
                if y[row] == 1 {
                    left_pos += 1.0;
                }

                let here = x[[row, f]];
                let next = x[[order[k + 1], f]];
                if here == next {
                    continue;
                }

                let right_n = n - left_n;
                let right_pos = total_pos - left_pos;
                let impurity = (left_n * gini(left_pos, left_n) + right_n * gini(right_pos, right_n)) / n;

                if best.as_ref().map_or(true, |b| impurity < b.impurity) {
                    let mut threshold = here + (next - here) / 2.0;
                    if threshold >= next {
                        threshold = here;
                    }
                    best = Some(BestSplit {
                        feature: f,
                        threshold,
                        impurity,
                    });
                }
            }
        }
        best
    }

    fn leaf_proba(&self, x: &Array2<f64>, row: usize) -> f64 {
        let mut i = 0;
        loop {
            match self.nodes[i] {
                Node::Leaf { proba } => return proba,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    i = if x[[row, feature]] <= threshold { left } else { right };
                }
            }
        }
    }
}

impl Classifier for DecisionTreeClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<u8>) -> Result<(), ModelError> {
        check_fit_input(x, y)?;
        if self.min_samples_split < 2 {
            return Err(ModelError::InvalidParameter(
                "min_samples_split must be at least 2".to_string(),
            ));
        }
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut indices: Vec<usize> = (0..x.nrows()).collect();
        self.fit_indices(x, y, &mut indices, &mut rng);
        Ok(())
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>, ModelError> {
        if !self.is_fitted() {
            return Err(ModelError::NotFitted("DecisionTreeClassifier"));
        }
        if x.ncols() != self.n_features {
            return Err(ModelError::ShapeMismatch {
                expected: self.n_features,
                got: x.ncols(),
            });
        }
        Ok((0..x.nrows()).map(|row| self.leaf_proba(x, row)).collect())
    }

    /// Ties go to class 0.
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<u8>, ModelError> {
        Ok(self.predict_proba(x)?.mapv(|p| u8::from(p > 0.5)))
    }
}
