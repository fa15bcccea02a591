use std::fmt;

use crate::pipeline::{AnalysisReport, ForestResult, LinearResult, LogisticResult};

fn fmt_vec(values: &[f64]) -> String {
    let inner: Vec<String> = values.iter().map(|v| format!("{v:.8}")).collect();
    format!("[[{}]]", inner.join(" "))
}

/// AUC with `digits` decimals, or `n/a` when no curve was drawn.
pub fn auc_text(auc: Option<f64>, digits: usize) -> String {
    auc.map_or_else(|| "n/a".to_string(), |a| format!("{a:.digits$}"))
}

impl fmt::Display for LogisticResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "C: {}", self.c)?;
        writeln!(f, "Coefficient of each feature: {}", fmt_vec(&self.coefficients))?;
        writeln!(f, "Training accuracy: {}", self.train_accuracy)?;
        writeln!(f, "Test accuracy: {}", self.test_accuracy)?;
        writeln!(f, "Intercept: {:.6}", self.intercept)?;
        writeln!(f, "ROC AUC: {}", auc_text(self.auc, 4))
    }
}

impl fmt::Display for ForestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Random forest ({} trees)", self.n_trees)?;
        writeln!(f, "Training accuracy: {}", self.train_accuracy)?;
        writeln!(f, "Test accuracy: {}", self.test_accuracy)?;
        writeln!(f, "ROC AUC: {}", auc_text(self.auc, 4))?;
        writeln!(f)?;

        writeln!(
            f,
            "{:<28} {:>9} {:>9} {:>10} {:>10}",
            "id", "P(baked)", "P(roast)", "predicted", "actual"
        )?;
        for row in &self.preview {
            writeln!(
                f,
                "{:<28} {:>9.3} {:>9.3} {:>10} {:>10}",
                row.id, row.proba[0], row.proba[1], row.predicted, row.actual
            )?;
        }
        writeln!(f)?;

        writeln!(f, "{}", self.confusion)?;
        writeln!(f)?;

        let pairs: Vec<String> = self
            .importances
            .iter()
            .map(|(name, imp)| format!("('{name}', {imp})"))
            .collect();
        writeln!(f, "Feature importances: [{}]", pairs.join(", "))
    }
}

impl fmt::Display for LinearResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Linear regression (style code on scaled features)")?;
        writeln!(f, "Coefficients: {}", fmt_vec(&self.coefficients))?;
        writeln!(f, "Intercept: {:.6}", self.intercept)?;
        writeln!(f, "Training R^2: {:.4}", self.train_r2)?;
        writeln!(f, "Test R^2: {:.4}", self.test_r2)?;
        writeln!(f, "Test MSE: {:.4}", self.test_mse)
    }
}

impl fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (baked, roasted) = self.class_counts;
        writeln!(
            f,
            "{} entries, {} non-null ({} dropped); {} roasted, {} baked",
            self.clean.rows_before,
            self.clean.rows_after(),
            self.clean.rows_dropped,
            roasted,
            baked
        )?;
        if let (Some(secs), Some(hours)) = (&self.cook_time_summary, &self.cook_time_hours_summary) {
            writeln!(f, "\ntotalTimeInSeconds\n{secs}")?;
            writeln!(f, "\ntotalTimeInHours\n{hours}")?;
        }
        writeln!(
            f,
            "\n{} of {} recipes take longer than {} s",
            self.long_cook_count,
            self.clean.rows_after(),
            self.long_cook_seconds
        )?;
        writeln!(f, "Split: {} train / {} test", self.n_train, self.n_test)?;
        writeln!(f, "Features: {}\n", self.feature_names.join(", "))?;

        for result in &self.logistic {
            writeln!(f, "{result}")?;
        }
        writeln!(f, "{}", self.forest)?;
        write!(f, "{}", self.linear)
    }
}

#[cfg(test)]
mod tests {
    use crate::data::model::CookingStyle;
    use crate::metrics::ConfusionMatrix;
    use crate::models::Penalty;
    use crate::pipeline::PredictionPreview;

    use super::*;

    #[test]
    fn logistic_block_matches_console_layout() {
        let result = LogisticResult {
            penalty: Penalty::L1,
            c: 0.1,
            coefficients: vec![0.5],
            intercept: 0.0,
            train_accuracy: 0.75,
            test_accuracy: 0.5,
            roc: None,
            auc: None,
        };
        let text = result.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "C: 0.1");
        assert_eq!(lines[1], "Coefficient of each feature: [[0.50000000]]");
        assert_eq!(lines[2], "Training accuracy: 0.75");
        assert_eq!(lines[3], "Test accuracy: 0.5");
        assert_eq!(lines[5], "ROC AUC: n/a");
    }

    #[test]
    fn forest_block_lists_predictions_and_importances() {
        let result = ForestResult {
            n_trees: 3,
            train_accuracy: 1.0,
            test_accuracy: 1.0,
            preview: vec![PredictionPreview {
                id: "Roast-Beef-1".to_string(),
                actual: CookingStyle::Roasted,
                predicted: CookingStyle::Roasted,
                proba: [0.25, 0.75],
            }],
            confusion: ConfusionMatrix {
                counts: [[1, 0], [0, 1]],
            },
            importances: vec![("totalTimeInSeconds".to_string(), 1.0)],
            roc: Some(Vec::new()),
            auc: Some(1.0),
        };
        let text = result.to_string();
        assert!(text.contains("Roast-Beef-1"));
        assert!(text.contains("0.750"));
        assert!(text.contains("Feature importances: [('totalTimeInSeconds', 1)]"));
        assert!(text.contains("Actual Style"));
        assert!(text.contains("ROC AUC: 1.0000"));
    }
}
