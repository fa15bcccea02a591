use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::models::{MaxFeatures, Penalty};

/// Analysis configuration. Every field has a default, so a config file only
/// needs the values it changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Where the recipes come from
    pub source: DataSource,

    /// Split settings
    pub split: SplitConfig,

    /// Logistic regression grid
    pub logistic: LogisticConfig,

    /// Random forest settings
    pub forest: ForestConfig,

    /// Number of leading test rows echoed in the forest report
    pub preview_rows: usize,

    /// Threshold (seconds) for the "long cook time" count
    pub long_cook_seconds: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            source: DataSource::default(),
            split: SplitConfig::default(),
            logistic: LogisticConfig::default(),
            forest: ForestConfig::default(),
            preview_rows: 10,
            long_cook_seconds: 3600.0,
        }
    }
}

/// Input files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataSource {
    /// One file per style, tagged on load.
    SplitFiles { roast: PathBuf, bake: PathBuf },
    /// Legacy `style-all.csv` carrying its own `sw` column.
    Combined { path: PathBuf },
}

impl Default for DataSource {
    fn default() -> Self {
        DataSource::in_dir(Path::new("../data"))
    }
}

impl DataSource {
    /// `style-roast.csv` and `style-bake.csv` inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        DataSource::SplitFiles {
            roast: dir.join("style-roast.csv"),
            bake: dir.join("style-bake.csv"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    /// Fraction of rows held out for testing
    pub test_fraction: f64,

    /// Seed for the shuffle
    pub seed: u64,

    /// Keep class proportions equal on both sides
    pub stratified: bool,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.3,
            seed: 0,
            stratified: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogisticConfig {
    pub penalty: Penalty,

    /// Inverse regularisation strengths to try, in order
    pub c_values: Vec<f64>,

    pub max_iter: usize,
}

impl Default for LogisticConfig {
    fn default() -> Self {
        Self {
            penalty: Penalty::L1,
            c_values: vec![10.0, 1.0, 0.1, 0.001],
            max_iter: 10_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub max_features: MaxFeatures,
    pub bootstrap: bool,
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: None,
            max_features: MaxFeatures::Sqrt,
            bootstrap: true,
            seed: 0,
        }
    }
}

impl AnalysisConfig {
    /// Read a JSON config file. Relative data paths stay relative to the
    /// working directory.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config file {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_reference_analysis() {
        let cfg = AnalysisConfig::default();
        assert_eq!(cfg.split.test_fraction, 0.3);
        assert_eq!(cfg.split.seed, 0);
        assert_eq!(cfg.logistic.penalty, Penalty::L1);
        assert_eq!(cfg.logistic.c_values, vec![10.0, 1.0, 0.1, 0.001]);
        assert_eq!(
            cfg.source,
            DataSource::SplitFiles {
                roast: PathBuf::from("../data/style-roast.csv"),
                bake: PathBuf::from("../data/style-bake.csv"),
            }
        );
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let cfg: AnalysisConfig = serde_json::from_str(
            r#"{
                "source": { "kind": "combined", "path": "data/style-all.csv" },
                "split": { "seed": 42 },
                "forest": { "n_estimators": 10, "max_features": "all" }
            }"#,
        )
        .unwrap();

        assert_eq!(
            cfg.source,
            DataSource::Combined {
                path: PathBuf::from("data/style-all.csv")
            }
        );
        assert_eq!(cfg.split.seed, 42);
        assert_eq!(cfg.split.test_fraction, 0.3);
        assert_eq!(cfg.forest.n_estimators, 10);
        assert_eq!(cfg.forest.max_features, MaxFeatures::All);
        assert!(cfg.forest.bootstrap);
        assert_eq!(cfg.preview_rows, 10);
    }

    #[test]
    fn reads_config_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("analysis.json");
        std::fs::write(&path, r#"{ "logistic": { "penalty": "l2", "c_values": [1.0] } }"#).unwrap();

        let cfg = AnalysisConfig::from_json_file(&path).unwrap();
        assert_eq!(cfg.logistic.penalty, Penalty::L2);
        assert_eq!(cfg.logistic.c_values, vec![1.0]);

        assert!(AnalysisConfig::from_json_file(&dir.path().join("missing.json")).is_err());
    }
}
