use ndarray::{Array1, Array2, Axis};

use crate::models::ModelError;

// ---------------------------------------------------------------------------
// Standard scaler
// ---------------------------------------------------------------------------

/// Per-column standardisation: `(x - mean) / std`, with the population
/// standard deviation. Constant columns keep a scale of 1.
#[derive(Debug, Clone, Default)]
pub struct StandardScaler {
    mean: Option<Array1<f64>>,
    scale: Option<Array1<f64>>,
}

impl StandardScaler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Learn column means and scales from `x`.
    pub fn fit(&mut self, x: &Array2<f64>) -> Result<&mut Self, ModelError> {
        if x.nrows() == 0 {
            return Err(ModelError::EmptyInput);
        }
        let mean = x.mean_axis(Axis(0)).ok_or(ModelError::EmptyInput)?;
        let scale = x
            .std_axis(Axis(0), 0.0)
            .mapv(|s| if s > f64::EPSILON { s } else { 1.0 });

        self.mean = Some(mean);
        self.scale = Some(scale);
        Ok(self)
    }

    /// Apply the learned standardisation.
    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>, ModelError> {
        let (Some(mean), Some(scale)) = (&self.mean, &self.scale) else {
            return Err(ModelError::NotFitted("StandardScaler"));
        };
        if x.ncols() != mean.len() {
            return Err(ModelError::ShapeMismatch {
                expected: mean.len(),
                got: x.ncols(),
            });
        }
        Ok((x - mean) / scale)
    }

    pub fn fit_transform(&mut self, x: &Array2<f64>) -> Result<Array2<f64>, ModelError> {
        self.fit(x)?;
        self.transform(x)
    }

    /// Learned column means.
    pub fn mean(&self) -> Option<&Array1<f64>> {
        self.mean.as_ref()
    }

    /// Learned column scales.
    pub fn scale(&self) -> Option<&Array1<f64>> {
        self.scale.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    #[test]
    fn training_columns_end_up_centred_and_unit_variance() {
        let x = array![[120.0, 1.0], [1800.0, 1.0], [3600.0, 1.0], [172800.0, 1.0]];
        let mut sc = StandardScaler::new();
        let z = sc.fit_transform(&x).unwrap();

        let col = z.column(0);
        let mean = col.sum() / col.len() as f64;
        let var = col.mapv(|v| (v - mean).powi(2)).sum() / col.len() as f64;
        assert!(mean.abs() < 1e-12);
        assert!((var - 1.0).abs() < 1e-12);

        // constant column: scale 1, centred to 0
        assert_eq!(sc.scale().unwrap()[1], 1.0);
        assert!(z.column(1).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_rows_use_training_statistics() {
        let mut sc = StandardScaler::new();
        sc.fit(&array![[0.0], [2.0]]).unwrap();
        let z = sc.transform(&array![[4.0]]).unwrap();
        assert_eq!(z[[0, 0]], 3.0);
    }

    #[test]
    fn transform_requires_fit_and_matching_width() {
        let sc = StandardScaler::new();
        assert!(matches!(sc.transform(&array![[1.0]]), Err(ModelError::NotFitted(_))));

        let mut sc = StandardScaler::new();
        sc.fit(&array![[1.0], [2.0]]).unwrap();
        assert!(matches!(
            sc.transform(&array![[1.0, 2.0]]),
            Err(ModelError::ShapeMismatch { expected: 1, got: 2 })
        ));
    }
}
