use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value as JsonValue;

use super::model::{CookingStyle, Recipe, RecipeDataset, COOK_TIME_FEATURE};
use super::DataError;

/// Column holding the recipe identifier.
pub const ID_COLUMN: &str = "id";
/// Column holding the style word in the combined legacy file.
pub const STYLE_COLUMN: &str = "sw";

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load one style-specific file and tag every row with `style`.
/// Dispatch by extension.
///
/// Supported formats:
/// * `.csv`  – header row; only `id` and `totalTimeInSeconds` are read
/// * `.json` – `[{ "id": ..., "totalTimeInSeconds": ... }, ...]`
pub fn load_file(path: &Path, style: CookingStyle) -> Result<RecipeDataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "csv" => load_style_csv(path, style)?,
        "json" => load_style_json(path, style)?,
        other => return Err(DataError::UnsupportedExtension(other.to_string()).into()),
    };

    log::info!(
        "{}: read {} {} recipes",
        path.display(),
        dataset.len(),
        style
    );
    Ok(dataset)
}

/// Load the roasted and baked files and append baked rows after roasted rows.
pub fn load_roast_and_bake(roast_path: &Path, bake_path: &Path) -> Result<RecipeDataset> {
    let roast = load_file(roast_path, CookingStyle::Roasted)
        .with_context(|| format!("loading roasted recipes from {}", roast_path.display()))?;
    let bake = load_file(bake_path, CookingStyle::Baked)
        .with_context(|| format!("loading baked recipes from {}", bake_path.display()))?;
    Ok(roast.concat(bake))
}

// ---------------------------------------------------------------------------
// CSV loaders
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, any column order.
/// Columns other than `id` and `totalTimeInSeconds` are ignored.
fn load_style_csv(path: &Path, style: CookingStyle) -> Result<RecipeDataset> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers = reader.headers().context("reading CSV headers")?.clone();

    let id_idx = column_index(&headers, ID_COLUMN, path)?;
    let time_idx = column_index(&headers, COOK_TIME_FEATURE, path)?;

    let mut recipes = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        recipes.push(Recipe {
            id: record.get(id_idx).unwrap_or("").to_string(),
            total_time_seconds: parse_cook_time(record.get(time_idx).unwrap_or(""), row_no, path)?,
            style,
        });
    }

    Ok(RecipeDataset::new(recipes))
}

/// Load the legacy combined file (`style-all.csv`): the same two columns plus
/// a `sw` column naming the style of each row.
pub fn load_combined(path: &Path) -> Result<RecipeDataset> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers = reader.headers().context("reading CSV headers")?.clone();

    let id_idx = column_index(&headers, ID_COLUMN, path)?;
    let time_idx = column_index(&headers, COOK_TIME_FEATURE, path)?;
    let style_idx = column_index(&headers, STYLE_COLUMN, path)?;

    let mut recipes = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let style: CookingStyle = record
            .get(style_idx)
            .unwrap_or("")
            .parse()
            .with_context(|| format!("{}, row {row_no}", path.display()))?;
        recipes.push(Recipe {
            id: record.get(id_idx).unwrap_or("").to_string(),
            total_time_seconds: parse_cook_time(record.get(time_idx).unwrap_or(""), row_no, path)?,
            style,
        });
    }

    log::info!("{}: read {} recipes", path.display(), recipes.len());
    Ok(RecipeDataset::new(recipes))
}

fn column_index(headers: &csv::StringRecord, name: &str, path: &Path) -> Result<usize, DataError> {
    headers
        .iter()
        .position(|h| h.trim() == name)
        .ok_or_else(|| DataError::MissingColumn {
            path: path.to_path_buf(),
            column: name.to_string(),
        })
}

/// Empty and NA-like cells are nulls; anything else must parse as a number.
fn parse_cook_time(s: &str, row: usize, path: &Path) -> Result<Option<f64>, DataError> {
    let s = s.trim();
    if is_null_token(s) {
        return Ok(None);
    }
    s.parse::<f64>().map(Some).map_err(|_| DataError::BadNumber {
        path: path.to_path_buf(),
        row,
        value: s.to_string(),
    })
}

fn is_null_token(s: &str) -> bool {
    matches!(s, "" | "NA" | "N/A" | "NaN" | "nan" | "null" | "NULL" | "None")
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented):
///
/// ```json
/// [
///   { "id": "Roasted-Chicken-123", "totalTimeInSeconds": 4500 },
///   { "id": "Roast-Beef-456", "totalTimeInSeconds": null },
///   ...
/// ]
/// ```
fn load_style_json(path: &Path, style: CookingStyle) -> Result<RecipeDataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut recipes = Vec::with_capacity(records.len());
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        let id = match obj.get(ID_COLUMN) {
            Some(JsonValue::String(s)) => s.clone(),
            Some(JsonValue::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };

        let total_time_seconds = match obj.get(COOK_TIME_FEATURE) {
            None | Some(JsonValue::Null) => None,
            Some(JsonValue::Number(n)) => n.as_f64(),
            Some(JsonValue::String(s)) => parse_cook_time(s, i, path)?,
            Some(other) => {
                return Err(DataError::BadNumber {
                    path: path.to_path_buf(),
                    row: i,
                    value: other.to_string(),
                }
                .into())
            }
        };

        recipes.push(Recipe {
            id,
            total_time_seconds,
            style,
        });
    }

    Ok(RecipeDataset::new(recipes))
}
