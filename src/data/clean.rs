use std::fmt;

use super::model::RecipeDataset;

// ---------------------------------------------------------------------------
// Null handling
// ---------------------------------------------------------------------------

/// Row counts before and after dropping incomplete rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanReport {
    pub rows_before: usize,
    pub rows_dropped: usize,
}

impl CleanReport {
    pub fn rows_after(&self) -> usize {
        self.rows_before - self.rows_dropped
    }
}

/// Drop every row without a usable cook time (null or non-finite).
pub fn drop_missing(dataset: RecipeDataset) -> (RecipeDataset, CleanReport) {
    let rows_before = dataset.len();
    let recipes: Vec<_> = dataset
        .recipes
        .into_iter()
        .filter(|r| r.total_time_seconds.is_some_and(f64::is_finite))
        .collect();

    let report = CleanReport {
        rows_before,
        rows_dropped: rows_before - recipes.len(),
    };
    if report.rows_dropped > 0 {
        log::warn!(
            "dropped {} of {} recipes with no cook time",
            report.rows_dropped,
            report.rows_before
        );
    }
    (RecipeDataset::new(recipes), report)
}

/// Number of rows whose cook time exceeds `seconds`.
pub fn count_longer_than(dataset: &RecipeDataset, seconds: f64) -> usize {
    dataset
        .recipes
        .iter()
        .filter(|r| r.total_time_seconds.is_some_and(|t| t > seconds))
        .count()
}

// ---------------------------------------------------------------------------
// Descriptive statistics
// ---------------------------------------------------------------------------

/// Count, mean, sample std and quartiles of a numeric column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

/// Summarise `values`, ignoring NaNs. `None` when nothing is left.
pub fn describe(values: &[f64]) -> Option<Summary> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);

    let n = sorted.len();
    let mean = sorted.iter().sum::<f64>() / n as f64;
    let std = if n > 1 {
        let ss: f64 = sorted.iter().map(|v| (v - mean).powi(2)).sum();
        (ss / (n - 1) as f64).sqrt()
    } else {
        f64::NAN
    };

    Some(Summary {
        count: n,
        mean,
        std,
        min: sorted[0],
        q25: quantile(&sorted, 0.25),
        median: quantile(&sorted, 0.5),
        q75: quantile(&sorted, 0.75),
        max: sorted[n - 1],
    })
}

/// Linear-interpolated quantile of already sorted, non-empty data.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "count  {:>14.6}", self.count as f64)?;
        writeln!(f, "mean   {:>14.6}", self.mean)?;
        writeln!(f, "std    {:>14.6}", self.std)?;
        writeln!(f, "min    {:>14.6}", self.min)?;
        writeln!(f, "25%    {:>14.6}", self.q25)?;
        writeln!(f, "50%    {:>14.6}", self.median)?;
        writeln!(f, "75%    {:>14.6}", self.q75)?;
        write!(f, "max    {:>14.6}", self.max)
    }
}
