use std::collections::{BTreeMap, BTreeSet};

use crate::color::ColorMap;
use crate::data::model::CookingStyle;
use crate::pipeline::AnalysisReport;
use crate::report::auc_text;

// ---------------------------------------------------------------------------
// Histogram
// ---------------------------------------------------------------------------

/// One histogram bar: bin centre (hours) and row count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bin {
    pub center: f64,
    pub count: usize,
}

/// Bin cook times (hours) into `[0, max_hours)` with fixed-width bins.
/// Returns the bins and the number of values at or beyond `max_hours`.
pub fn histogram(hours: &[f64], bin_width: f64, max_hours: f64) -> (Vec<Bin>, usize) {
    if bin_width <= 0.0 || max_hours <= 0.0 {
        return (Vec::new(), hours.len());
    }
    let n_bins = (max_hours / bin_width).ceil() as usize;
    let mut counts = vec![0usize; n_bins];
    let mut overflow = 0;
    for &h in hours {
        let k = (h / bin_width).floor();
        if h >= max_hours || k < 0.0 || k as usize >= n_bins {
            overflow += 1;
        } else {
            counts[k as usize] += 1;
        }
    }
    let bins = counts
        .into_iter()
        .enumerate()
        .map(|(k, count)| Bin {
            center: (k as f64 + 0.5) * bin_width,
            count,
        })
        .collect();
    (bins, overflow)
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// What the central plot shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlotView {
    CookTimes,
    Roc,
}

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Finished analysis being displayed.
    pub report: AnalysisReport,

    pub view: PlotView,

    /// Styles drawn in the histogram.
    pub visible_styles: BTreeSet<CookingStyle>,

    /// Histogram bin width in hours.
    pub bin_width_hours: f64,

    /// Right edge of the histogram in hours.
    pub max_hours: f64,

    /// Cached histogram per style, with the overflow count (cached).
    pub bins: BTreeMap<CookingStyle, (Vec<Bin>, usize)>,

    /// ROC curves drawn: one flag per logistic model, then the forest.
    pub visible_curves: Vec<bool>,

    pub color_map: ColorMap,
}

impl AppState {
    pub fn new(report: AnalysisReport) -> Self {
        let n_curves = report.logistic.len() + 1;
        let mut state = Self {
            report,
            view: PlotView::CookTimes,
            visible_styles: CookingStyle::ALL.into_iter().collect(),
            bin_width_hours: 0.25,
            max_hours: 6.0,
            bins: BTreeMap::new(),
            visible_curves: vec![true; n_curves],
            color_map: ColorMap::new(n_curves),
        };
        state.rebin();
        state
    }

    /// Recompute `bins` after a bin-width or range change.
    pub fn rebin(&mut self) {
        self.bins = self
            .report
            .cook_times
            .iter()
            .map(|(&style, secs)| {
                let hours: Vec<f64> = secs.iter().map(|s| s / 3600.0).collect();
                (style, histogram(&hours, self.bin_width_hours, self.max_hours))
            })
            .collect();
    }

    /// Toggle a style in the histogram.
    pub fn toggle_style(&mut self, style: CookingStyle) {
        if !self.visible_styles.remove(&style) {
            self.visible_styles.insert(style);
        }
    }

    /// Show all curves.
    pub fn select_all_curves(&mut self) {
        self.visible_curves.iter_mut().for_each(|v| *v = true);
    }

    /// Hide all curves.
    pub fn select_no_curves(&mut self) {
        self.visible_curves.iter_mut().for_each(|v| *v = false);
    }

    /// Legend name of ROC curve `i`.
    pub fn curve_name(&self, i: usize) -> String {
        match self.report.logistic.get(i) {
            Some(lr) => format!("logistic C={} (AUC {})", lr.c, auc_text(lr.auc, 3)),
            None => format!("random forest (AUC {})", auc_text(self.report.forest.auc, 3)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn histogram_counts_and_overflow() {
        let (bins, overflow) = histogram(&[0.1, 0.2, 0.6, 1.9, 2.0, 48.0], 0.5, 2.0);
        assert_eq!(bins.len(), 4);
        assert_eq!(bins.iter().map(|b| b.count).collect::<Vec<_>>(), vec![2, 1, 0, 1]);
        assert_eq!(overflow, 2);
        assert_eq!(bins[0].center, 0.25);
    }

    #[test]
    fn degenerate_bin_width_counts_everything_as_overflow() {
        let (bins, overflow) = histogram(&[1.0, 2.0], 0.0, 6.0);
        assert!(bins.is_empty());
        assert_eq!(overflow, 2);
    }
}
