mod app;
mod color;
mod config;
mod data;
mod metrics;
mod models;
mod pipeline;
mod preprocessing;
mod report;
mod state;
mod ui;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use config::{AnalysisConfig, DataSource};

/// Classify recipes as roasted or baked from their cook time.
///
/// Reads `style-roast.csv` and `style-bake.csv`, fits a logistic regression
/// grid, a random forest and a linear regression, and prints the results.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// JSON analysis configuration (all fields optional)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Directory holding style-roast.csv and style-bake.csv
    #[arg(long, short = 'd', conflicts_with = "combined")]
    data_dir: Option<PathBuf>,

    /// Legacy combined file with an `sw` style column
    #[arg(long)]
    combined: Option<PathBuf>,

    /// Open a plot window after printing the report
    #[arg(long)]
    plot: bool,
}

impl Cli {
    fn analysis_config(&self) -> Result<AnalysisConfig> {
        let mut cfg = match &self.config {
            Some(path) => AnalysisConfig::from_json_file(path)?,
            None => AnalysisConfig::default(),
        };
        if let Some(dir) = &self.data_dir {
            cfg.source = DataSource::in_dir(dir);
        }
        if let Some(path) = &self.combined {
            cfg.source = DataSource::Combined { path: path.clone() };
        }
        Ok(cfg)
    }
}

fn run(cli: &Cli) -> Result<()> {
    let cfg = cli.analysis_config()?;
    log::debug!("configuration: {cfg:?}");

    let report = pipeline::run(&cfg)?;
    println!("{report}");

    if cli.plot {
        app::show(report).map_err(|e| anyhow::anyhow!("plot window: {e}"))?;
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
