//! The analysis, start to finish:
//!
//! ```text
//! load → label → clean → split → scale → fit → evaluate
//! ```
//!
//! [`run`] returns an [`AnalysisReport`]; printing and plotting happen
//! elsewhere.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use ndarray::{Array1, Array2, Axis};

use crate::config::{AnalysisConfig, DataSource, ForestConfig, LogisticConfig};
use crate::data::clean::{self, CleanReport, Summary};
use crate::data::loader;
use crate::data::model::{CookingStyle, RecipeDataset};
use crate::data::split::{self, Split};
use crate::metrics::{self, ConfusionMatrix, RocPoint};
use crate::models::{
    Classifier, LinearRegression, LogisticRegression, ModelError, Penalty, RandomForestClassifier,
};
use crate::preprocessing::StandardScaler;

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// One point of the logistic regression grid.
#[derive(Debug, Clone)]
pub struct LogisticResult {
    pub penalty: Penalty,
    pub c: f64,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    pub train_accuracy: f64,
    pub test_accuracy: f64,
    /// `None` when the test side holds a single style.
    pub roc: Option<Vec<RocPoint>>,
    pub auc: Option<f64>,
}

/// A test row as echoed in the forest report.
#[derive(Debug, Clone)]
pub struct PredictionPreview {
    pub id: String,
    pub actual: CookingStyle,
    pub predicted: CookingStyle,
    /// `[P(baked), P(roasted)]`
    pub proba: [f64; 2],
}

#[derive(Debug, Clone)]
pub struct ForestResult {
    pub n_trees: usize,
    pub train_accuracy: f64,
    pub test_accuracy: f64,
    pub preview: Vec<PredictionPreview>,
    pub confusion: ConfusionMatrix,
    /// `(feature name, importance)` in feature order.
    pub importances: Vec<(String, f64)>,
    pub roc: Option<Vec<RocPoint>>,
    pub auc: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct LinearResult {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    pub train_r2: f64,
    pub test_r2: f64,
    pub test_mse: f64,
}

/// Everything the console report and the plot window show.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub clean: CleanReport,
    /// `(baked, roasted)` after cleaning
    pub class_counts: (usize, usize),
    pub cook_time_summary: Option<Summary>,
    pub cook_time_hours_summary: Option<Summary>,
    pub long_cook_seconds: f64,
    pub long_cook_count: usize,
    pub n_train: usize,
    pub n_test: usize,
    pub feature_names: Vec<String>,
    pub logistic: Vec<LogisticResult>,
    pub forest: ForestResult,
    pub linear: LinearResult,
    /// Cleaned cook times (seconds) per style, for the histogram.
    pub cook_times: BTreeMap<CookingStyle, Vec<f64>>,
}

// ---------------------------------------------------------------------------
// Stages
// ---------------------------------------------------------------------------

/// Load and label the raw table from the configured source.
pub fn load_dataset(source: &DataSource) -> Result<RecipeDataset> {
    match source {
        DataSource::SplitFiles { roast, bake } => loader::load_roast_and_bake(roast, bake),
        DataSource::Combined { path } => loader::load_combined(path)
            .with_context(|| format!("loading combined recipes from {}", path.display())),
    }
}

/// Train/test feature matrices and labels after scaling.
struct Prepared {
    x_train: Array2<f64>,
    x_test: Array2<f64>,
    y_train: Array1<u8>,
    y_test: Array1<u8>,
    test_rows: Vec<usize>,
}

fn prepare(dataset: &RecipeDataset, split: &Split) -> Result<Prepared, ModelError> {
    let x = dataset.feature_matrix();
    let y = dataset.labels();

    let x_train = x.select(Axis(0), &split.train);
    let x_test = x.select(Axis(0), &split.test);

    let mut scaler = StandardScaler::new();
    let x_train = scaler.fit_transform(&x_train)?;
    let x_test = scaler.transform(&x_test)?;
    if let (Some(mean), Some(scale)) = (scaler.mean(), scaler.scale()) {
        log::debug!("scaler mean {mean}, scale {scale}");
    }

    Ok(Prepared {
        x_train,
        x_test,
        y_train: y.select(Axis(0), &split.train),
        y_test: y.select(Axis(0), &split.test),
        test_rows: split.test.clone(),
    })
}

/// ROC curve and its area, or `None` for both when `y_test` has one class.
fn optional_roc(
    model: &str,
    y_test: &Array1<u8>,
    scores: &Array1<f64>,
) -> Result<(Option<Vec<RocPoint>>, Option<f64>), ModelError> {
    match metrics::roc_curve(y_test, scores) {
        Ok(points) => {
            let area = metrics::auc(&points);
            Ok((Some(points), Some(area)))
        }
        Err(ModelError::SingleClass) => {
            log::warn!("{model}: test rows hold a single style, skipping the ROC curve");
            Ok((None, None))
        }
        Err(e) => Err(e),
    }
}

fn fit_logistic_grid(cfg: &LogisticConfig, data: &Prepared) -> Result<Vec<LogisticResult>, ModelError> {
    cfg.c_values
        .iter()
        .map(|&c| {
            let mut clf = LogisticRegression::new(cfg.penalty, c).with_max_iter(cfg.max_iter);
            clf.fit(&data.x_train, &data.y_train)?;

            let scores = clf.predict_proba(&data.x_test)?;
            let (roc, auc) = optional_roc(&format!("logistic C={c}"), &data.y_test, &scores)?;
            log::debug!("logistic C={c}: {} iterations", clf.n_iter());
            let result = LogisticResult {
                penalty: cfg.penalty,
                c,
                coefficients: clf.coefficients().map(|w| w.to_vec()).unwrap_or_default(),
                intercept: clf.intercept(),
                train_accuracy: clf.score(&data.x_train, &data.y_train)?,
                test_accuracy: clf.score(&data.x_test, &data.y_test)?,
                roc,
                auc,
            };
            log::info!(
                "logistic C={c}: train accuracy {:.4}, test accuracy {:.4}",
                result.train_accuracy,
                result.test_accuracy
            );
            Ok(result)
        })
        .collect()
}

fn fit_forest(
    cfg: &ForestConfig,
    data: &Prepared,
    dataset: &RecipeDataset,
    preview_rows: usize,
) -> Result<ForestResult, ModelError> {
    let mut clf = RandomForestClassifier::new(cfg.n_estimators)
        .with_max_depth(cfg.max_depth)
        .with_max_features(cfg.max_features)
        .with_bootstrap(cfg.bootstrap)
        .with_seed(cfg.seed);
    clf.fit(&data.x_train, &data.y_train)?;

    let predicted = clf.predict(&data.x_test)?;
    let proba = clf.predict_proba_matrix(&data.x_test)?;
    let scores = proba.column(1).to_owned();
    let (roc, auc) = optional_roc("random forest", &data.y_test, &scores)?;

    let preview = data
        .test_rows
        .iter()
        .zip(predicted.iter())
        .zip(proba.rows())
        .take(preview_rows)
        .map(|((&row, &pred), p)| {
            let recipe = &dataset.recipes[row];
            PredictionPreview {
                id: recipe.id.clone(),
                actual: recipe.style,
                predicted: CookingStyle::from_code(pred).unwrap_or(CookingStyle::Baked),
                proba: [p[0], p[1]],
            }
        })
        .collect();

    let importances = dataset
        .feature_names()
        .into_iter()
        .zip(clf.feature_importances().iter().copied())
        .collect();

    let result = ForestResult {
        n_trees: clf.n_trees(),
        train_accuracy: clf.score(&data.x_train, &data.y_train)?,
        test_accuracy: metrics::accuracy(&data.y_test, &predicted)?,
        preview,
        confusion: ConfusionMatrix::from_labels(&data.y_test, &predicted)?,
        importances,
        roc,
        auc,
    };
    log::info!(
        "random forest ({} trees): test accuracy {:.4}",
        result.n_trees,
        result.test_accuracy
    );
    Ok(result)
}

/// Linear probability model: OLS of the style code on the scaled features.
fn fit_linear(data: &Prepared) -> Result<LinearResult, ModelError> {
    let y_train = data.y_train.mapv(f64::from);
    let y_test = data.y_test.mapv(f64::from);

    let mut lr = LinearRegression::new();
    lr.fit(&data.x_train, &y_train)?;
    let test_pred = lr.predict(&data.x_test)?;

    Ok(LinearResult {
        coefficients: lr.coefficients().map(|w| w.to_vec()).unwrap_or_default(),
        intercept: lr.intercept(),
        train_r2: lr.score(&data.x_train, &y_train)?,
        test_r2: metrics::r2_score(&y_test, &test_pred)?,
        test_mse: metrics::mean_squared_error(&y_test, &test_pred)?,
    })
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Run the full analysis described by `config`.
pub fn run(config: &AnalysisConfig) -> Result<AnalysisReport> {
    let raw = load_dataset(&config.source)?;
    log::info!("assembled {} recipes", raw.len());

    let (dataset, clean_report) = clean::drop_missing(raw);
    if dataset.is_empty() {
        return Err(ModelError::EmptyInput).context("no recipes with a cook time");
    }
    let class_counts = dataset.class_counts();
    if class_counts.0 == 0 || class_counts.1 == 0 {
        return Err(ModelError::SingleClass).context("after dropping rows without a cook time");
    }

    let seconds: Vec<f64> = dataset
        .recipes
        .iter()
        .filter_map(|r| r.total_time_seconds)
        .collect();
    let hours: Vec<f64> = dataset
        .recipes
        .iter()
        .filter_map(|r| r.total_time_hours())
        .collect();

    let split = if config.split.stratified {
        split::stratified_split(
            &dataset.labels().to_vec(),
            config.split.test_fraction,
            config.split.seed,
        )?
    } else {
        split::train_test_split(dataset.len(), config.split.test_fraction, config.split.seed)?
    };
    log::info!(
        "split {} rows: {} train / {} test",
        dataset.len(),
        split.train.len(),
        split.test.len()
    );

    let prepared = prepare(&dataset, &split).context("scaling features")?;
    let logistic = fit_logistic_grid(&config.logistic, &prepared).context("logistic regression")?;
    let forest = fit_forest(&config.forest, &prepared, &dataset, config.preview_rows)
        .context("random forest")?;
    let linear = fit_linear(&prepared).context("linear regression")?;

    let cook_times = CookingStyle::ALL
        .into_iter()
        .map(|style| (style, dataset.cook_times(style)))
        .collect();

    Ok(AnalysisReport {
        clean: clean_report,
        class_counts,
        cook_time_summary: clean::describe(&seconds),
        cook_time_hours_summary: clean::describe(&hours),
        long_cook_seconds: config.long_cook_seconds,
        long_cook_count: clean::count_longer_than(&dataset, config.long_cook_seconds),
        n_train: split.train.len(),
        n_test: split.test.len(),
        feature_names: dataset.feature_names(),
        logistic,
        forest,
        linear,
        cook_times,
    })
}

#[cfg(test)]
mod tests {
    use std::fmt::Write as _;
    use std::path::Path;

    use super::*;

    /// Roasted recipes take longer; a few rows have no cook time.
    fn write_fixture(dir: &Path) {
        let mut roast = String::from("id,totalTimeInSeconds,rating\n");
        let mut bake = String::from("id,totalTimeInSeconds,rating\n");
        for i in 0..60 {
            let t = 6000 + (i % 12) * 600;
            writeln!(roast, "Roast-{i},{t},4").unwrap();
        }
        for i in 0..60 {
            let t = 1200 + (i % 10) * 180;
            writeln!(bake, "Bake-{i},{t},3").unwrap();
        }
        roast.push_str("Roast-null-1,,4\nRoast-null-2,,5\n");
        bake.push_str("Bake-null-1,,2\n");
        std::fs::write(dir.join("style-roast.csv"), roast).unwrap();
        std::fs::write(dir.join("style-bake.csv"), bake).unwrap();
    }

    fn config_for(dir: &Path) -> AnalysisConfig {
        let mut cfg = AnalysisConfig {
            source: DataSource::in_dir(dir),
            ..AnalysisConfig::default()
        };
        cfg.forest.n_estimators = 20;
        cfg
    }

    #[test]
    fn end_to_end_on_separable_cook_times() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path());

        let report = run(&config_for(dir.path())).unwrap();

        // 123 rows assembled, 3 without cook time
        assert_eq!(report.clean.rows_before, 123);
        assert_eq!(report.clean.rows_dropped, 3);
        assert_eq!(report.class_counts, (60, 60));
        assert_eq!(report.n_test, 36);
        assert_eq!(report.n_train, 84);

        assert_eq!(report.logistic.len(), 4);
        let weak = &report.logistic[0];
        assert_eq!(weak.c, 10.0);
        assert!(weak.coefficients[0] > 0.0);
        assert!(weak.test_accuracy > 0.9);

        let strongest = &report.logistic[3];
        assert_eq!(strongest.c, 0.001);
        assert_eq!(strongest.coefficients[0], 0.0);

        assert_eq!(report.forest.n_trees, 20);
        assert!(report.forest.test_accuracy > 0.95);
        assert_eq!(report.forest.confusion.total(), 36);
        assert_eq!(report.forest.preview.len(), 10);
        assert_eq!(report.forest.importances[0].0, "totalTimeInSeconds");
        assert!((report.forest.importances[0].1 - 1.0).abs() < 1e-9);

        assert!(report.linear.coefficients[0] > 0.0);
        assert!(report.linear.train_r2 > 0.5);

        assert_eq!(report.cook_times[&CookingStyle::Roasted].len(), 60);
        assert_eq!(report.long_cook_count, 60);
    }

    #[test]
    fn stratified_split_balances_the_test_side() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path());
        let mut cfg = config_for(dir.path());
        cfg.split.stratified = true;

        let report = run(&cfg).unwrap();
        let cm = report.forest.confusion;
        let actual_roasted = cm.counts[1][0] + cm.counts[1][1];
        assert_eq!(actual_roasted, 18);
    }

    #[test]
    fn single_style_test_side_skips_roc_but_keeps_the_report() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("style-roast.csv"), "id,totalTimeInSeconds\nr,9000\n").unwrap();
        let mut bake = String::from("id,totalTimeInSeconds\n");
        for i in 0..9 {
            writeln!(bake, "b{i},{}", 1200 + i * 60).unwrap();
        }
        std::fs::write(dir.path().join("style-bake.csv"), bake).unwrap();

        // 3 test rows, all baked by largest-remainder apportionment
        let mut cfg = config_for(dir.path());
        cfg.split.stratified = true;
        let report = run(&cfg).unwrap();

        assert_eq!(report.n_test, 3);
        assert_eq!(report.forest.confusion.counts[1], [0, 0]);
        for lr in &report.logistic {
            assert!(lr.roc.is_none());
            assert!(lr.auc.is_none());
        }
        assert!(report.forest.roc.is_none());
        assert!(report.forest.auc.is_none());
        assert!(report.to_string().contains("ROC AUC: n/a"));
    }

    #[test]
    fn constant_cook_times_still_produce_a_report() {
        let dir = tempfile::tempdir().unwrap();
        let mut roast = String::from("id,totalTimeInSeconds\n");
        let mut bake = String::from("id,totalTimeInSeconds\n");
        for i in 0..20 {
            writeln!(roast, "r{i},3600").unwrap();
            writeln!(bake, "b{i},3600").unwrap();
        }
        std::fs::write(dir.path().join("style-roast.csv"), roast).unwrap();
        std::fs::write(dir.path().join("style-bake.csv"), bake).unwrap();

        let mut cfg = config_for(dir.path());
        cfg.split.stratified = true;
        let report = run(&cfg).unwrap();

        assert_eq!(report.linear.coefficients, vec![0.0]);
        assert!((report.linear.intercept - 0.5).abs() < 1e-12);
        for lr in &report.logistic {
            assert_eq!(lr.coefficients, vec![0.0]);
        }
        assert_eq!(report.forest.confusion.total(), 12);
    }

    #[test]
    fn single_style_data_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("style-roast.csv"), "id,totalTimeInSeconds\na,100\nb,200\n").unwrap();
        std::fs::write(dir.path().join("style-bake.csv"), "id,totalTimeInSeconds\nc,\n").unwrap();

        let err = run(&config_for(dir.path())).unwrap_err();
        assert!(matches!(err.downcast_ref::<ModelError>(), Some(ModelError::SingleClass)));
    }

    #[test]
    fn missing_input_file_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = run(&config_for(dir.path())).unwrap_err();
        assert!(format!("{err:#}").contains("style-roast.csv"));
    }
}
