use ndarray::{Array1, Array2, Axis};

use super::ModelError;

/// Ordinary least squares with an intercept.
#[derive(Debug, Clone, Default)]
pub struct LinearRegression {
    coef: Option<Array1<f64>>,
    intercept: f64,
}

impl LinearRegression {
    pub fn new() -> Self {
        Self::default()
    }

    /// Least squares on centred data: solve `(XcᵀXc) w = Xcᵀyc`, then
    /// `b = ȳ - x̄·w`. Constant columns get a zero weight, so an all-constant
    /// design yields the mean of `y` as intercept.
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<(), ModelError> {
        if x.nrows() == 0 || x.ncols() == 0 {
            return Err(ModelError::EmptyInput);
        }
        if x.nrows() != y.len() {
            return Err(ModelError::ShapeMismatch {
                expected: x.nrows(),
                got: y.len(),
            });
        }

        let x_mean = x.mean_axis(Axis(0)).ok_or(ModelError::EmptyInput)?;
        let y_mean = y.mean().ok_or(ModelError::EmptyInput)?;
        let xc = x - &x_mean;
        let yc = y - y_mean;

        let active: Vec<usize> = (0..x.ncols())
            .filter(|&j| {
                let col = xc.column(j);
                let spread = x.column(j).iter().fold(1.0_f64, |m, v| m.max(v.abs()));
                col.iter().any(|v| v.abs() > 1e-12 * spread)
            })
            .collect();
        if active.len() < x.ncols() {
            log::debug!(
                "linear regression: {} constant column(s) get a zero coefficient",
                x.ncols() - active.len()
            );
        }

        let mut coef = Array1::<f64>::zeros(x.ncols());
        if !active.is_empty() {
            let xa = xc.select(Axis(1), &active);
            let beta = solve(xa.t().dot(&xa), xa.t().dot(&yc))?;
            for (&j, &w) in active.iter().zip(beta.iter()) {
                coef[j] = w;
            }
        }

        self.intercept = y_mean - x_mean.dot(&coef);
        self.coef = Some(coef);
        Ok(())
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>, ModelError> {
        let coef = self
            .coef
            .as_ref()
            .ok_or(ModelError::NotFitted("LinearRegression"))?;
        if x.ncols() != coef.len() {
            return Err(ModelError::ShapeMismatch {
                expected: coef.len(),
                got: x.ncols(),
            });
        }
        Ok(x.dot(coef) + self.intercept)
    }

    /// Coefficient of determination on `(x, y)`.
    pub fn score(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<f64, ModelError> {
        let pred = self.predict(x)?;
        crate::metrics::r2_score(y, &pred)
    }

    pub fn coefficients(&self) -> Option<&Array1<f64>> {
        self.coef.as_ref()
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }
}

/// Gaussian elimination with partial pivoting.
fn solve(mut a: Array2<f64>, mut b: Array1<f64>) -> Result<Array1<f64>, ModelError> {
    let n = b.len();
    let scale = a.iter().fold(0.0_f64, |m, v| m.max(v.abs())).max(1.0);

    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&i, &j| a[[i, col]].abs().total_cmp(&a[[j, col]].abs()))
            .unwrap_or(col);
        if a[[pivot, col]].abs() <= 1e-12 * scale {
            return Err(ModelError::Singular);
        }
        if pivot != col {
            for k in 0..n {
                a.swap([col, k], [pivot, k]);
            }
            b.swap(col, pivot);
        }

        for row in col + 1..n {
            let factor = a[[row, col]] / a[[col, col]];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[[row, k]] -= factor * a[[col, k]];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = Array1::<f64>::zeros(n);
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| a[[row, k]] * x[k]).sum();
        x[row] = (b[row] - tail) / a[[row, row]];
    }
    Ok(x)
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    #[test]
    fn recovers_an_exact_line() {
        let x = array![[0.0], [1.0], [2.0], [3.0]];
        let y = array![1.0, 3.0, 5.0, 7.0];
        let mut lr = LinearRegression::new();
        lr.fit(&x, &y).unwrap();

        assert!((lr.intercept() - 1.0).abs() < 1e-9);
        assert!((lr.coefficients().unwrap()[0] - 2.0).abs() < 1e-9);
        assert!((lr.score(&x, &y).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn two_features() {
        let x = array![[1.0, 0.0], [0.0, 1.0], [1.0, 1.0], [2.0, 1.0], [0.0, 0.0]];
        let y = x.column(0).mapv(|a| 3.0 * a) - x.column(1).mapv(|b| 2.0 * b) + 0.5;
        let mut lr = LinearRegression::new();
        lr.fit(&x, &y).unwrap();

        let coef = lr.coefficients().unwrap();
        assert!((coef[0] - 3.0).abs() < 1e-9);
        assert!((coef[1] + 2.0).abs() < 1e-9);
        assert!((lr.intercept() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn constant_feature_gets_zero_weight_and_mean_intercept() {
        let x = array![[2.0], [2.0], [2.0]];
        let y = array![0.0, 1.0, 1.0];
        let mut lr = LinearRegression::new();
        lr.fit(&x, &y).unwrap();

        assert_eq!(lr.coefficients().unwrap()[0], 0.0);
        assert!((lr.intercept() - 2.0 / 3.0).abs() < 1e-12);
        assert!(lr.predict(&x).unwrap().iter().all(|p| (p - 2.0 / 3.0).abs() < 1e-12));
    }

    #[test]
    fn constant_column_next_to_an_informative_one() {
        let x = array![[0.0, 5.0], [1.0, 5.0], [2.0, 5.0], [3.0, 5.0]];
        let y = array![1.0, 3.0, 5.0, 7.0];
        let mut lr = LinearRegression::new();
        lr.fit(&x, &y).unwrap();

        let coef = lr.coefficients().unwrap();
        assert!((coef[0] - 2.0).abs() < 1e-9);
        assert_eq!(coef[1], 0.0);
        assert!((lr.intercept() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn duplicated_columns_are_singular() {
        let x = array![[0.0, 0.0], [1.0, 1.0], [2.0, 2.0]];
        let y = array![0.0, 1.0, 1.0];
        assert!(matches!(
            LinearRegression::new().fit(&x, &y),
            Err(ModelError::Singular)
        ));
    }

    #[test]
    fn predict_requires_fit() {
        assert!(matches!(
            LinearRegression::new().predict(&array![[1.0]]),
            Err(ModelError::NotFitted(_))
        ));
    }
}
