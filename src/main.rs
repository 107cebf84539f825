use std::path::PathBuf;

use clap::Parser;

use glucast::config::PipelineConfig;
use glucast::pipeline;

/// Train a short-horizon glucose forecaster from a directory of CSV exports.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Directory of source CSV files.
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Directory for output artifacts.
    #[arg(long, default_value = "outputs")]
    out_dir: PathBuf,

    /// Resampling cadence in minutes.
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u32).range(1..))]
    cadence_minutes: u32,

    /// Lookback window in minutes.
    #[arg(long, default_value_t = 60)]
    past_minutes: u32,

    /// Forecast horizon in minutes.
    #[arg(long, default_value_t = 30)]
    horizon_minutes: u32,

    /// Training epochs.
    #[arg(long, default_value_t = 100)]
    epochs: usize,

    /// Mini-batch size.
    #[arg(long, default_value_t = 256)]
    batch_size: usize,

    /// Minimum viable window count.
    #[arg(long, default_value_t = 100)]
    min_windows: usize,

    /// Only load the first N files (smoke runs).
    #[arg(long)]
    max_files: Option<usize>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = PipelineConfig {
        data_dir: cli.data_dir,
        out_dir: cli.out_dir,
        cadence_minutes: cli.cadence_minutes,
        past_minutes: cli.past_minutes,
        horizon_minutes: cli.horizon_minutes,
        epochs: cli.epochs,
        batch_size: cli.batch_size,
        min_windows: cli.min_windows,
        max_files: cli.max_files,
        ..PipelineConfig::default()
    };

    let report = pipeline::run(&config)?;
    println!(
        "MAE = {:.2} mg/dL | RMSE = {:.2} mg/dL | R² = {:.3}",
        report.test_mae_mgdl, report.test_rmse_mgdl, report.test_r2
    );
    println!("report: {}", config.out_dir.join("training_report.json").display());
    Ok(())
}
