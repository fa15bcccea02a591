//! Estimators fitted by the analysis.
//!
//! - `LogisticRegression`: L1/L2-penalised binary logistic regression
//! - `DecisionTreeClassifier` / `RandomForestClassifier`: CART trees and a
//!   bagged ensemble of them
//! - `LinearRegression`: ordinary least squares

mod forest;
mod linear;
mod logistic;
mod tree;

pub use forest::{MaxFeatures, RandomForestClassifier};
pub use linear::LinearRegression;
pub use logistic::{LogisticRegression, Penalty};
pub use tree::DecisionTreeClassifier;

use ndarray::{Array1, Array2};
use thiserror::Error;

/// Failures while fitting or applying an estimator.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("empty input")]
    EmptyInput,

    #[error("shape mismatch: expected {expected}, got {got}")]
    ShapeMismatch { expected: usize, got: usize },

    #[error("{0} used before fit")]
    NotFitted(&'static str),

    #[error("invalid hyper-parameter: {0}")]
    InvalidParameter(String),

    #[error("labels must be 0 or 1, found {0}")]
    InvalidLabel(u8),

    #[error("both classes must be present")]
    SingleClass,

    #[error("singular system: features are collinear or constant")]
    Singular,
}

/// A fitted-in-place binary classifier over `n × d` feature matrices.
pub trait Classifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<u8>) -> Result<(), ModelError>;

    /// Probability of class 1 for each row.
    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>, ModelError>;

    /// Hard class predictions.
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<u8>, ModelError> {
        Ok(self.predict_proba(x)?.mapv(|p| u8::from(p >= 0.5)))
    }

    /// Mean accuracy on `(x, y)`.
    fn score(&self, x: &Array2<f64>, y: &Array1<u8>) -> Result<f64, ModelError> {
        let pred = self.predict(x)?;
        crate::metrics::accuracy(y, &pred)
    }
}

/// Shared input validation for `fit`.
fn check_fit_input(x: &Array2<f64>, y: &Array1<u8>) -> Result<(), ModelError> {
    if x.nrows() == 0 || x.ncols() == 0 {
        return Err(ModelError::EmptyInput);
    }
    if x.nrows() != y.len() {
        return Err(ModelError::ShapeMismatch {
            expected: x.nrows(),
            got: y.len(),
        });
    }
    if let Some(&bad) = y.iter().find(|&&v| v > 1) {
        return Err(ModelError::InvalidLabel(bad));
    }
    Ok(())
}
