use std::fmt;

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use super::{check_fit_input, Classifier, ModelError};

/// Weight penalty. The intercept is never penalised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Penalty {
    L1,
    L2,
}

impl fmt::Display for Penalty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Penalty::L1 => f.write_str("l1"),
            Penalty::L2 => f.write_str("l2"),
        }
    }
}

/// Numerically safe logistic function.
pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

fn soft_threshold(v: f64, t: f64) -> f64 {
    v.signum() * (v.abs() - t).max(0.0)
}

// ---------------------------------------------------------------------------
// LogisticRegression
// ---------------------------------------------------------------------------

/// Binary logistic regression minimising
/// `penalty(w) + C * Σ logloss(y_i, w·x_i + b)`.
///
/// Solved by proximal gradient descent on the equivalent mean-loss form with
/// `λ = 1 / (C n)`. The step size is `1 / L` with `L` bounded by the trace of
/// the Hessian bound `XᵀX / 4n`, so no line search is needed.
#[derive(Debug, Clone)]
pub struct LogisticRegression {
    pub penalty: Penalty,
    /// Inverse regularisation strength; must be positive.
    pub c: f64,
    pub max_iter: usize,
    pub tol: f64,
    coef: Option<Array1<f64>>,
    intercept: f64,
    n_iter: usize,
}

impl LogisticRegression {
    pub fn new(penalty: Penalty, c: f64) -> Self {
        Self {
            penalty,
            c,
            max_iter: 10_000,
            tol: 1e-8,
            coef: None,
            intercept: 0.0,
            n_iter: 0,
        }
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Fitted feature weights.
    pub fn coefficients(&self) -> Option<&Array1<f64>> {
        self.coef.as_ref()
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Iterations used by the last `fit`.
    pub fn n_iter(&self) -> usize {
        self.n_iter
    }

    /// Raw scores `w·x + b`.
    pub fn decision_function(&self, x: &Array2<f64>) -> Result<Array1<f64>, ModelError> {
        let coef = self
            .coef
            .as_ref()
            .ok_or(ModelError::NotFitted("LogisticRegression"))?;
        if x.ncols() != coef.len() {
            return Err(ModelError::ShapeMismatch {
                expected: coef.len(),
                got: x.ncols(),
            });
        }
        Ok(x.dot(coef) + self.intercept)
    }
}

impl Classifier for LogisticRegression {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<u8>) -> Result<(), ModelError> {
        check_fit_input(x, y)?;
        if !(self.c > 0.0 && self.c.is_finite()) {
            return Err(ModelError::InvalidParameter(format!("C must be positive, got {}", self.c)));
        }

        let n = x.nrows() as f64;
        let yf = y.mapv(f64::from);
        let lambda = 1.0 / (self.c * n);

        // Lipschitz bound of the mean logistic loss gradient (intercept column included).
        let trace = 1.0 + x.iter().map(|v| v * v).sum::<f64>() / n;
        let mut lipschitz = 0.25 * trace;
        if self.penalty == Penalty::L2 {
            lipschitz += lambda;
        }
        let step = 1.0 / lipschitz;

        let mut w = Array1::<f64>::zeros(x.ncols());
        let mean_y = yf.mean().unwrap_or(0.5).clamp(1e-12, 1.0 - 1e-12);
        let mut b = (mean_y / (1.0 - mean_y)).ln();

        self.n_iter = self.max_iter;
        for iter in 0..self.max_iter {
            let p = (x.dot(&w) + b).mapv(sigmoid);
            let resid = &p - &yf;
            let grad_w = x.t().dot(&resid) / n;
            let grad_b = resid.sum() / n;

            let w_new = match self.penalty {
                Penalty::L1 => (&w - &(grad_w * step)).mapv(|v| soft_threshold(v, step * lambda)),
                Penalty::L2 => &w - &((grad_w + &w * lambda) * step),
            };
            let b_new = b - step * grad_b;

            let delta = w_new
                .iter()
                .zip(w.iter())
                .map(|(a, o)| (a - o).abs())
                .fold((b_new - b).abs(), f64::max);
            let magnitude = w_new.iter().fold(b_new.abs(), |m, v| m.max(v.abs())).max(1.0);

            w = w_new;
            b = b_new;

            if delta <= self.tol * magnitude {
                self.n_iter = iter + 1;
                break;
            }
        }

        if self.n_iter == self.max_iter {
            log::warn!(
                "logistic regression (C={}) did not converge in {} iterations",
                self.c,
                self.max_iter
            );
        }
        log::debug!(
            "logistic regression penalty={} C={} converged in {} iterations",
            self.penalty,
            self.c,
            self.n_iter
        );

        self.coef = Some(w);
        self.intercept = b;
        Ok(())
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>, ModelError> {
        Ok(self.decision_function(x)?.mapv(sigmoid))
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    fn separable() -> (Array2<f64>, Array1<u8>) {
        let x = array![[-2.0], [-1.5], [-1.0], [-0.5], [0.5], [1.0], [1.5], [2.0]];
        let y = array![0, 0, 0, 0, 1, 1, 1, 1];
        (x, y)
    }

    #[test]
    fn sigmoid_is_stable_at_extremes() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert!(sigmoid(-1000.0) >= 0.0);
        assert!(sigmoid(1000.0) <= 1.0);
        assert!((sigmoid(2.0) + sigmoid(-2.0) - 1.0).abs() < 1e-15);
    }

    #[test]
    fn weak_regularisation_fits_separable_data() {
        let (x, y) = separable();
        let mut clf = LogisticRegression::new(Penalty::L1, 10.0);
        clf.fit(&x, &y).unwrap();

        assert!(clf.coefficients().unwrap()[0] > 0.0);
        assert_eq!(clf.score(&x, &y).unwrap(), 1.0);
    }

    #[test]
    fn strong_l1_penalty_zeroes_the_coefficient() {
        let x = array![[-2.0], [-1.0], [0.0], [1.0], [2.0], [3.0]];
        let y = array![0, 1, 1, 0, 1, 1];
        let mut clf = LogisticRegression::new(Penalty::L1, 1e-4);
        clf.fit(&x, &y).unwrap();

        assert_eq!(clf.coefficients().unwrap()[0], 0.0);
        // intercept-only model predicts the majority class everywhere
        let pred = clf.predict(&x).unwrap();
        assert!(pred.iter().all(|&p| p == 1));
        let p = clf.predict_proba(&x).unwrap();
        assert!((p[0] - 4.0 / 6.0).abs() < 1e-6);
    }

    #[test]
    fn l2_shrinks_but_keeps_sign() {
        let (x, y) = separable();
        let mut strong = LogisticRegression::new(Penalty::L2, 0.01);
        let mut weak = LogisticRegression::new(Penalty::L2, 10.0);
        strong.fit(&x, &y).unwrap();
        weak.fit(&x, &y).unwrap();

        let s = strong.coefficients().unwrap()[0];
        let w = weak.coefficients().unwrap()[0];
        assert!(s > 0.0);
        assert!(s < w);
    }

    #[test]
    fn rejects_bad_inputs() {
        let (x, y) = separable();
        let mut clf = LogisticRegression::new(Penalty::L1, 0.0);
        assert!(matches!(clf.fit(&x, &y), Err(ModelError::InvalidParameter(_))));

        let mut clf = LogisticRegression::new(Penalty::L1, 1.0);
        assert!(matches!(
            clf.fit(&x, &array![0, 1]),
            Err(ModelError::ShapeMismatch { .. })
        ));
        assert!(matches!(
            clf.fit(&x, &array![0, 0, 0, 0, 2, 1, 1, 1]),
            Err(ModelError::InvalidLabel(2))
        ));
        assert!(matches!(clf.predict(&x), Err(ModelError::NotFitted(_))));
    }
}
