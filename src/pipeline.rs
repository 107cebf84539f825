use anyhow::{ensure, Context, Result};
use chrono::Utc;
use log::info;

use crate::config::PipelineConfig;
use crate::data::loader;
use crate::data::model::FEATURE_COUNT;
use crate::error::PipelineError;
use crate::metrics;
use crate::model::{LinearRegressor, Regressor};
use crate::report::{self, TrainingReport};
use crate::scale::{GlobalScaler, ScaledSeries};
use crate::split::Split;
use crate::window::{self, Window};

// ---------------------------------------------------------------------------
// End-to-end run
// ---------------------------------------------------------------------------

/// The cadence divides every bucket and step-count computation; zero must be
/// rejected here with a descriptive error rather than panic downstream.
fn validate(config: &PipelineConfig) -> Result<()> {
    ensure!(
        config.cadence_minutes > 0,
        "cadence_minutes must be at least 1"
    );
    Ok(())
}

/// Run the whole pipeline: load → fit scaler → transform → window → split →
/// train → evaluate → write artifacts. Strictly sequential; per-file load
/// failures are absorbed inside the loader, everything else is fatal.
pub fn run(config: &PipelineConfig) -> Result<TrainingReport> {
    validate(config)?;
    std::fs::create_dir_all(&config.out_dir)
        .with_context(|| format!("creating output directory {}", config.out_dir.display()))?;

    let series = loader::load_dir(&config.data_dir, config.cadence_minutes, config.max_files)?;
    let total_buckets: usize = series.iter().map(|s| s.len()).sum();
    info!("{} series, {} buckets total", series.len(), total_buckets);

    // The fit covers the full corpus; it must complete before any transform.
    let scaler = GlobalScaler::fit(&series).ok_or_else(|| PipelineError::NoValidSeries {
        dir: config.data_dir.clone(),
    })?;
    let scaled: Vec<ScaledSeries> = series.iter().map(|s| scaler.transform_series(s)).collect();

    let past = window::past_steps(config.past_minutes, config.cadence_minutes);
    let future = window::future_steps(config.horizon_minutes, config.cadence_minutes);
    let windows = window::build_windows(&scaled, past, future);
    info!(
        "{} windows ({} past steps, {} future steps)",
        windows.len(),
        past,
        future
    );

    let split = Split::plan(
        windows.len(),
        config.train_ratio,
        config.val_ratio,
        config.min_windows,
    )?;
    let train = &windows[split.train.clone()];
    let val = &windows[split.val.clone()];
    let test = &windows[split.test.clone()];
    info!(
        "split: {} train / {} val / {} test",
        train.len(),
        val.len(),
        test.len()
    );

    info!("training for {} epochs (batch {})", config.epochs, config.batch_size);
    let mut model = LinearRegressor::new(past * FEATURE_COUNT);
    let history = model.fit(train, val, config.epochs, config.batch_size);

    let predicted: Vec<f64> = test.iter().map(|w| model.predict(w)).collect();
    let truth: Vec<f64> = test.iter().map(|w| w.target).collect();
    let scores = metrics::evaluate(&scaler, &predicted, &truth);
    info!(
        "test MAE = {:.2} mg/dL | RMSE = {:.2} mg/dL | R² = {:.3}",
        scores.mae, scores.rmse, scores.r2
    );

    // ---- Artifacts ----
    let scaler_path = config.out_dir.join("scaler_bundle.json");
    std::fs::write(
        &scaler_path,
        serde_json::to_string_pretty(&scaler.bundle()).context("serializing scaler bundle")?,
    )
    .with_context(|| format!("writing {}", scaler_path.display()))?;

    let model_path = config.out_dir.join("regressor.json");
    std::fs::write(
        &model_path,
        serde_json::to_string(&model).context("serializing regressor")?,
    )
    .with_context(|| format!("writing {}", model_path.display()))?;

    report::plot_loss_curves(&history, &config.out_dir.join("loss_curves.png"))?;
    let y_pred_mgdl: Vec<f64> = predicted.iter().map(|&v| scaler.inverse_glucose(v)).collect();
    let y_true_mgdl: Vec<f64> = truth.iter().map(|&v| scaler.inverse_glucose(v)).collect();
    report::plot_pred_vs_true(
        &y_true_mgdl,
        &y_pred_mgdl,
        &config.out_dir.join("pred_vs_true.png"),
    )?;

    let report = TrainingReport {
        timestamp: Utc::now().to_rfc3339(),
        data_dir: config.data_dir.clone(),
        epochs: config.epochs,
        batch_size: config.batch_size,
        past_minutes: config.past_minutes,
        horizon_minutes: config.horizon_minutes,
        examples_train: train.len(),
        examples_val: val.len(),
        examples_test: test.len(),
        test_mae_mgdl: scores.mae,
        test_rmse_mgdl: scores.rmse,
        test_r2: scores.r2,
        model_path,
        scaler_path,
    };
    report::write_report(&report, &config.out_dir.join("training_report.json"))?;

    Ok(report)
}

/// Preprocessing only: everything up to and including the split, returning
/// the fitted scaler, the concatenated windows, and the split plan. Useful
/// when the downstream model lives elsewhere.
pub fn prepare(config: &PipelineConfig) -> Result<(GlobalScaler, Vec<Window>, Split)> {
    validate(config)?;
    let series = loader::load_dir(&config.data_dir, config.cadence_minutes, config.max_files)?;
    let scaler = GlobalScaler::fit(&series).ok_or_else(|| PipelineError::NoValidSeries {
        dir: config.data_dir.clone(),
    })?;
    let scaled: Vec<ScaledSeries> = series.iter().map(|s| scaler.transform_series(s)).collect();

    let past = window::past_steps(config.past_minutes, config.cadence_minutes);
    let future = window::future_steps(config.horizon_minutes, config.cadence_minutes);
    let windows = window::build_windows(&scaled, past, future);
    let split = Split::plan(
        windows.len(),
        config.train_ratio,
        config.val_ratio,
        config.min_windows,
    )?;
    Ok((scaler, windows, split))
}
