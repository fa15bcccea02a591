//! Random forest ensemble
//!
//! Bagged CART trees with per-split feature subsampling. Class probabilities
//! are averaged across trees.

use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::{check_fit_input, Classifier, DecisionTreeClassifier, ModelError};

/// How many features each split may look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaxFeatures {
    /// `max(1, floor(sqrt(d)))`
    Sqrt,
    All,
    Count(usize),
}

impl MaxFeatures {
    fn resolve(self, n_features: usize) -> usize {
        let k = match self {
            MaxFeatures::Sqrt => (n_features as f64).sqrt().floor() as usize,
            MaxFeatures::All => n_features,
            MaxFeatures::Count(k) => k,
        };
        k.clamp(1, n_features.max(1))
    }
}

// ============================================================================
// RANDOM FOREST
// ============================================================================

/// Random forest classifier
#[derive(Debug, Clone)]
pub struct RandomForestClassifier {
    /// Number of trees
    pub n_estimators: usize,
    /// Max depth per tree (`None` = grow until pure)
    pub max_depth: Option<usize>,
    pub max_features: MaxFeatures,
    /// Draw a bootstrap resample per tree
    pub bootstrap: bool,
    /// Random seed
    pub seed: u64,
    trees: Vec<DecisionTreeClassifier>,
    importances: Vec<f64>,
}

impl Default for RandomForestClassifier {
    fn default() -> Self {
        Self::new(100)
    }
}

impl RandomForestClassifier {
    pub fn new(n_estimators: usize) -> Self {
        Self {
            n_estimators,
            max_depth: None,
            max_features: MaxFeatures::Sqrt,
            bootstrap: true,
            seed: 0,
            trees: Vec::new(),
            importances: Vec::new(),
        }
    }

    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_max_features(mut self, max_features: MaxFeatures) -> Self {
        self.max_features = max_features;
        self
    }

    pub fn with_bootstrap(mut self, bootstrap: bool) -> Self {
        self.bootstrap = bootstrap;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Number of fitted trees
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Mean of the per-tree importances, renormalised to sum to 1.
    pub fn feature_importances(&self) -> &[f64] {
        &self.importances
    }

    /// Class probabilities as an `n × 2` matrix: column 0 is P(class 0),
    /// column 1 is P(class 1).
    pub fn predict_proba_matrix(&self, x: &Array2<f64>) -> Result<Array2<f64>, ModelError> {
        let p1 = self.predict_proba(x)?;
        Ok(Array2::from_shape_fn((p1.len(), 2), |(i, c)| {
            if c == 1 {
                p1[i]
            } else {
                1.0 - p1[i]
            }
        }))
    }
}

impl Classifier for RandomForestClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<u8>) -> Result<(), ModelError> {
        check_fit_input(x, y)?;
        if self.n_estimators == 0 {
            return Err(ModelError::InvalidParameter(
                "n_estimators must be at least 1".to_string(),
            ));
        }

        let n = x.nrows();
        let k = self.max_features.resolve(x.ncols());
        let mut rng = StdRng::seed_from_u64(self.seed);

        self.trees.clear();
        let mut importances = vec![0.0; x.ncols()];

        for _ in 0..self.n_estimators {
            // Bootstrap sample
            let mut rows: Vec<usize> = if self.bootstrap {
                (0..n).map(|_| rng.gen_range(0..n)).collect()
            } else {
                (0..n).collect()
            };

            let mut tree = DecisionTreeClassifier::new(self.max_depth).with_max_features(Some(k));
            tree.fit_indices(x, y, &mut rows, &mut rng);

            for (acc, imp) in importances.iter_mut().zip(tree.feature_importances()) {
                *acc += imp;
            }
            self.trees.push(tree);
        }

        let sum: f64 = importances.iter().sum();
        if sum > 0.0 {
            for imp in &mut importances {
                *imp /= sum;
            }
        }
        self.importances = importances;

        log::debug!(
            "random forest: {} trees, {} features per split, mean depth {:.1}, mean nodes {:.1}",
            self.trees.len(),
            k,
            self.trees.iter().map(|t| t.depth() as f64).sum::<f64>() / self.trees.len() as f64,
            self.trees.iter().map(|t| t.n_nodes() as f64).sum::<f64>() / self.trees.len() as f64
        );
        Ok(())
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>, ModelError> {
        if self.trees.is_empty() {
            return Err(ModelError::NotFitted("RandomForestClassifier"));
        }
        let mut acc = Array1::<f64>::zeros(x.nrows());
        for tree in &self.trees {
            acc += &tree.predict_proba(x)?;
        }
        Ok(acc / self.trees.len() as f64)
    }

    /// Argmax of the averaged probabilities; ties go to class 0.
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<u8>, ModelError> {
        Ok(self.predict_proba(x)?.mapv(|p| u8::from(p > 0.5)))
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    fn two_clusters() -> (Array2<f64>, Array1<u8>) {
        let x = array![
            [1200.0, 0.0],
            [1500.0, 1.0],
            [1800.0, 0.0],
            [2100.0, 1.0],
            [2400.0, 0.0],
            [5400.0, 1.0],
            [6000.0, 0.0],
            [7200.0, 1.0],
            [9000.0, 0.0],
            [10800.0, 1.0]
        ];
        let y = array![0, 0, 0, 0, 0, 1, 1, 1, 1, 1];
        (x, y)
    }

    #[test]
    fn max_features_resolution() {
        assert_eq!(MaxFeatures::Sqrt.resolve(1), 1);
        assert_eq!(MaxFeatures::Sqrt.resolve(10), 3);
        assert_eq!(MaxFeatures::All.resolve(4), 4);
        assert_eq!(MaxFeatures::Count(9).resolve(4), 4);
    }

    #[test]
    fn separates_clusters_and_reports_importances() {
        let (x, y) = two_clusters();
        let mut clf = RandomForestClassifier::new(25)
            .with_max_features(MaxFeatures::All)
            .with_seed(7);
        clf.fit(&x, &y).unwrap();

        assert_eq!(clf.n_trees(), 25);
        assert_eq!(clf.score(&x, &y).unwrap(), 1.0);

        let imp = clf.feature_importances();
        assert!((imp.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!(imp[0] > imp[1]);
    }

    #[test]
    fn probability_matrix_rows_sum_to_one() {
        let (x, y) = two_clusters();
        let mut clf = RandomForestClassifier::new(10).with_seed(1);
        clf.fit(&x, &y).unwrap();

        let proba = clf.predict_proba_matrix(&x).unwrap();
        assert_eq!(proba.dim(), (10, 2));
        for row in proba.rows() {
            assert!((row.sum() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn same_seed_same_forest() {
        let (x, y) = two_clusters();
        let probe = array![[3000.0, 0.0], [4000.0, 1.0]];

        let mut a = RandomForestClassifier::new(15).with_seed(3);
        let mut b = RandomForestClassifier::new(15).with_seed(3);
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();
        assert_eq!(a.predict_proba(&probe).unwrap(), b.predict_proba(&probe).unwrap());
    }

    #[test]
    fn without_bootstrap_every_tree_sees_all_rows() {
        let (x, y) = two_clusters();
        let mut clf = RandomForestClassifier::new(3)
            .with_bootstrap(false)
            .with_max_features(MaxFeatures::All)
            .with_max_depth(Some(1));
        clf.fit(&x, &y).unwrap();
        let p = clf.predict_proba(&array![[1000.0, 0.0], [20000.0, 0.0]]).unwrap();
        assert_eq!(p, array![0.0, 1.0]);
    }

    #[test]
    fn zero_trees_is_invalid() {
        let (x, y) = two_clusters();
        let mut clf = RandomForestClassifier::new(0);
        assert!(matches!(clf.fit(&x, &y), Err(ModelError::InvalidParameter(_))));
        assert!(matches!(
            RandomForestClassifier::default().predict(&x),
            Err(ModelError::NotFitted(_))
        ));
    }
}
