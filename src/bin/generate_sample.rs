use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

/// Write a synthetic style-roast.csv / style-bake.csv pair.
#[derive(Parser, Debug)]
#[command(about)]
struct Args {
    /// Output directory
    #[arg(default_value = "data")]
    out_dir: PathBuf,

    /// Recipes per style
    #[arg(long, default_value_t = 4000)]
    rows: usize,

    #[arg(long, default_value_t = 42)]
    seed: u64,
}

#[derive(Serialize)]
struct Row {
    id: String,
    #[serde(rename = "totalTimeInSeconds")]
    total_time_in_seconds: Option<u64>,
    #[serde(rename = "recipeName")]
    recipe_name: String,
}

/// Box-Muller transform for a standard normal draw
fn gauss<R: Rng>(rng: &mut R) -> f64 {
    let u1: f64 = rng.gen::<f64>().max(1e-15);
    let u2: f64 = rng.gen();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

/// Log-normal cook time around `median_secs`, rounded to whole minutes and
/// clamped to [2 min, 48 h]. About 1% of rows have no cook time.
fn cook_time<R: Rng>(rng: &mut R, median_secs: f64, sigma: f64) -> Option<u64> {
    if rng.gen_bool(0.01) {
        return None;
    }
    let secs = median_secs * (sigma * gauss(rng)).exp();
    let minutes = (secs / 60.0).round().clamp(2.0, 48.0 * 60.0);
    Some(minutes as u64 * 60)
}

fn write_style(
    path: &Path,
    dishes: &[&str],
    rows: usize,
    median_secs: f64,
    rng: &mut StdRng,
) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    for i in 0..rows {
        let dish = dishes[rng.gen_range(0..dishes.len())];
        writer.serialize(Row {
            id: format!("{}-{}", dish.replace(' ', "-"), 1_000_000 + i),
            total_time_in_seconds: cook_time(rng, median_secs, 0.6),
            recipe_name: dish.to_string(),
        })?;
    }
    writer.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut rng = StdRng::seed_from_u64(args.seed);

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("creating {}", args.out_dir.display()))?;

    let roast = ["Roasted Chicken", "Roast Beef", "Roasted Vegetables", "Roasted Pork Loin"];
    let bake = ["Baked Ziti", "Baked Salmon", "Baked Potatoes", "Baked Apples"];

    let roast_path = args.out_dir.join("style-roast.csv");
    let bake_path = args.out_dir.join("style-bake.csv");
    write_style(&roast_path, &roast, args.rows, 4500.0, &mut rng)?;
    write_style(&bake_path, &bake, args.rows, 2700.0, &mut rng)?;

    println!(
        "Wrote {} recipes per style to {} and {}",
        args.rows,
        roast_path.display(),
        bake_path.display()
    );
    Ok(())
}
