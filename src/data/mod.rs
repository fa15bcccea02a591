/// Data layer: core types, loading, cleaning, and splitting.
///
/// Architecture:
/// ```text
///  style-roast.csv   style-bake.csv      (or style-all.csv / .json)
///        │                 │
///        ▼                 ▼
///   ┌──────────────────────────┐
///   │  loader                  │  parse + tag rows → RecipeDataset
///   └──────────────────────────┘
///        │
///        ▼
///   ┌──────────────────────────┐
///   │  clean                   │  drop rows without a cook time
///   └──────────────────────────┘
///        │
///        ▼
///   ┌──────────────────────────┐
///   │  split                   │  seeded train / test indices
///   └──────────────────────────┘
/// ```

pub mod clean;
pub mod loader;
pub mod model;
pub mod split;

use std::path::PathBuf;

use thiserror::Error;

/// Failures while assembling or partitioning the recipe table.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("{path}: missing required column '{column}'")]
    MissingColumn { path: PathBuf, column: String },

    #[error("{path}, row {row}: '{value}' is not a number")]
    BadNumber {
        path: PathBuf,
        row: usize,
        value: String,
    },

    #[error("unknown cooking style '{0}' (expected 'roasted' or 'baked')")]
    UnknownStyle(String),

    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),

    #[error("test fraction must be in (0, 1), got {0}")]
    BadTestFraction(f64),

    #[error("cannot split {n} rows with test fraction {fraction}: one side would be empty")]
    DegenerateSplit { n: usize, fraction: f64 },
}
