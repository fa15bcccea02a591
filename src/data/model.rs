use std::fmt;
use std::str::FromStr;

use ndarray::{Array1, Array2};

use super::DataError;

// ---------------------------------------------------------------------------
// CookingStyle – the binary label
// ---------------------------------------------------------------------------

/// Cooking style derived from the file grouping a recipe was scraped into.
///
/// Category codes follow lexical order of the category names, the same
/// encoding a categorical column gets: `baked = 0`, `roasted = 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CookingStyle {
    Baked,
    Roasted,
}

impl CookingStyle {
    /// Both styles, in category-code order.
    pub const ALL: [CookingStyle; 2] = [CookingStyle::Baked, CookingStyle::Roasted];

    /// Integer category code.
    pub fn code(self) -> u8 {
        match self {
            CookingStyle::Baked => 0,
            CookingStyle::Roasted => 1,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(CookingStyle::Baked),
            1 => Some(CookingStyle::Roasted),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CookingStyle::Baked => "baked",
            CookingStyle::Roasted => "roasted",
        }
    }
}

impl fmt::Display for CookingStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for CookingStyle {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "baked" => Ok(CookingStyle::Baked),
            "roasted" => Ok(CookingStyle::Roasted),
            _ => Err(DataError::UnknownStyle(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Recipe – one row
// ---------------------------------------------------------------------------

/// A single recipe row after tagging.
#[derive(Debug, Clone, PartialEq)]
pub struct Recipe {
    /// Recipe identifier (name + number on the source site).
    pub id: String,
    /// Total time in seconds; `None` when the source cell was empty.
    pub total_time_seconds: Option<f64>,
    pub style: CookingStyle,
}

impl Recipe {
    /// Cook time in hours, if known.
    pub fn total_time_hours(&self) -> Option<f64> {
        self.total_time_seconds.map(|s| s / 3600.0)
    }
}

// ---------------------------------------------------------------------------
// RecipeDataset – the assembled table
// ---------------------------------------------------------------------------

/// Name of the single numeric feature column.
pub const COOK_TIME_FEATURE: &str = "totalTimeInSeconds";

/// The assembled recipe table. Row position is the index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipeDataset {
    pub recipes: Vec<Recipe>,
}

impl RecipeDataset {
    pub fn new(recipes: Vec<Recipe>) -> Self {
        Self { recipes }
    }

    /// Append `other`'s rows after `self`'s, re-indexing from zero.
    pub fn concat(mut self, other: RecipeDataset) -> Self {
        self.recipes.extend(other.recipes);
        self
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    /// Names of the feature columns, in matrix column order.
    pub fn feature_names(&self) -> Vec<String> {
        vec![COOK_TIME_FEATURE.to_string()]
    }

    /// `n × 1` feature matrix of cook times. Missing values become NaN, so
    /// callers are expected to clean first.
    pub fn feature_matrix(&self) -> Array2<f64> {
        Array2::from_shape_fn((self.len(), 1), |(i, _)| {
            self.recipes[i].total_time_seconds.unwrap_or(f64::NAN)
        })
    }

    /// Label codes, one per row.
    pub fn labels(&self) -> Array1<u8> {
        self.recipes.iter().map(|r| r.style.code()).collect()
    }

    /// `(baked, roasted)` row counts.
    pub fn class_counts(&self) -> (usize, usize) {
        self.recipes.iter().fold((0, 0), |(b, r), rec| match rec.style {
            CookingStyle::Baked => (b + 1, r),
            CookingStyle::Roasted => (b, r + 1),
        })
    }

    /// Cook times (seconds) of the rows with the given style, skipping nulls.
    pub fn cook_times(&self, style: CookingStyle) -> Vec<f64> {
        self.recipes
            .iter()
            .filter(|r| r.style == style)
            .filter_map(|r| r.total_time_seconds)
            .collect()
    }
}
