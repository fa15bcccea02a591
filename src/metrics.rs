use std::fmt;

use ndarray::Array1;

use crate::data::model::CookingStyle;
use crate::models::ModelError;

fn check_lengths(a: usize, b: usize) -> Result<(), ModelError> {
    if a == 0 {
        return Err(ModelError::EmptyInput);
    }
    if a != b {
        return Err(ModelError::ShapeMismatch { expected: a, got: b });
    }
    Ok(())
}

/// Fraction of matching labels.
pub fn accuracy(y_true: &Array1<u8>, y_pred: &Array1<u8>) -> Result<f64, ModelError> {
    check_lengths(y_true.len(), y_pred.len())?;
    let hits = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();
    Ok(hits as f64 / y_true.len() as f64)
}

pub fn mean_squared_error(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<f64, ModelError> {
    check_lengths(y_true.len(), y_pred.len())?;
    let sse: f64 = y_true.iter().zip(y_pred).map(|(t, p)| (t - p).powi(2)).sum();
    Ok(sse / y_true.len() as f64)
}

/// `1 - SS_res / SS_tot`. A constant target scores 1 when predicted exactly
/// and 0 otherwise.
pub fn r2_score(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<f64, ModelError> {
    check_lengths(y_true.len(), y_pred.len())?;
    let mean = y_true.sum() / y_true.len() as f64;
    let ss_res: f64 = y_true.iter().zip(y_pred).map(|(t, p)| (t - p).powi(2)).sum();
    let ss_tot: f64 = y_true.iter().map(|t| (t - mean).powi(2)).sum();
    if ss_tot == 0.0 {
        return Ok(if ss_res == 0.0 { 1.0 } else { 0.0 });
    }
    Ok(1.0 - ss_res / ss_tot)
}

// ---------------------------------------------------------------------------
// Confusion matrix
// ---------------------------------------------------------------------------

/// 2×2 cross-tabulation, `counts[actual][predicted]`, indexed by style code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConfusionMatrix {
    pub counts: [[usize; 2]; 2],
}

impl ConfusionMatrix {
    pub fn from_labels(y_true: &Array1<u8>, y_pred: &Array1<u8>) -> Result<Self, ModelError> {
        check_lengths(y_true.len(), y_pred.len())?;
        let mut counts = [[0usize; 2]; 2];
        for (&t, &p) in y_true.iter().zip(y_pred) {
            if t > 1 {
                return Err(ModelError::InvalidLabel(t));
            }
            if p > 1 {
                return Err(ModelError::InvalidLabel(p));
            }
            counts[t as usize][p as usize] += 1;
        }
        Ok(Self { counts })
    }

    pub fn get(&self, actual: CookingStyle, predicted: CookingStyle) -> usize {
        self.counts[actual.code() as usize][predicted.code() as usize]
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:<14}{:>10}", "", "Predicted Style")?;
        write!(f, "{:<14}", "Actual Style")?;
        for style in CookingStyle::ALL {
            write!(f, "{:>10}", style.as_str())?;
        }
        for actual in CookingStyle::ALL {
            writeln!(f)?;
            write!(f, "{:<14}", actual.as_str())?;
            for predicted in CookingStyle::ALL {
                write!(f, "{:>10}", self.get(actual, predicted))?;
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// ROC
// ---------------------------------------------------------------------------

/// One operating point of a ROC curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RocPoint {
    pub fpr: f64,
    pub tpr: f64,
}

/// ROC curve for class 1 from `(0, 0)` to `(1, 1)`; tied scores form a
/// single step.
pub fn roc_curve(y_true: &Array1<u8>, scores: &Array1<f64>) -> Result<Vec<RocPoint>, ModelError> {
    check_lengths(y_true.len(), scores.len())?;
    let n_pos = y_true.iter().filter(|&&y| y == 1).count() as f64;
    let n_neg = y_true.len() as f64 - n_pos;
    if n_pos == 0.0 || n_neg == 0.0 {
        return Err(ModelError::SingleClass);
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

    let mut points = vec![RocPoint {
        fpr: 0.0,
        tpr: 0.0,
    }];
    let (mut tp, mut fp) = (0.0, 0.0);
    for (k, &i) in order.iter().enumerate() {
        if y_true[i] == 1 {
            tp += 1.0;
        } else {
            fp += 1.0;
        }
        let last_of_tie = order.get(k + 1).map_or(true, |&j| scores[j] != scores[i]);
        if last_of_tie {
            points.push(RocPoint {
                fpr: fp / n_neg,
                tpr: tp / n_pos,
            });
        }
    }
    Ok(points)
}

/// Trapezoidal area under a ROC curve.
pub fn auc(points: &[RocPoint]) -> f64 {
    points
        .windows(2)
        .map(|w| (w[1].fpr - w[0].fpr) * (w[1].tpr + w[0].tpr) / 2.0)
        .sum()
}
