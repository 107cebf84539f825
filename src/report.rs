use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use plotters::prelude::*;
use serde::{Deserialize, Serialize};

use crate::model::TrainHistory;

// ---------------------------------------------------------------------------
// TrainingReport – the machine-readable run record
// ---------------------------------------------------------------------------

/// One run's record, written as `training_report.json` and consumed by the
/// external report writer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    /// RFC 3339 run timestamp (UTC).
    pub timestamp: String,
    pub data_dir: PathBuf,
    pub epochs: usize,
    pub batch_size: usize,
    pub past_minutes: u32,
    pub horizon_minutes: u32,
    pub examples_train: usize,
    pub examples_val: usize,
    pub examples_test: usize,
    pub test_mae_mgdl: f64,
    pub test_rmse_mgdl: f64,
    pub test_r2: f64,
    pub model_path: PathBuf,
    pub scaler_path: PathBuf,
}

pub fn write_report(report: &TrainingReport, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("serializing training report")?;
    std::fs::write(path, json)
        .with_context(|| format!("writing report to {}", path.display()))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Visualization artifacts
// ---------------------------------------------------------------------------

/// Render the per-epoch train/validation MSE curves to a PNG.
pub fn plot_loss_curves(history: &TrainHistory, path: &Path) -> Result<()> {
    let n = history.train_loss.len();
    if n == 0 {
        return Err(anyhow!("empty training history"));
    }
    let y_max = history
        .train_loss
        .iter()
        .chain(&history.val_loss)
        .fold(0.0f64, |m, &v| m.max(v))
        .max(1e-9);

    let root = BitMapBackend::new(path, (900, 400)).into_drawing_area();
    root.fill(&WHITE).map_err(|e| anyhow!("filling canvas: {e}"))?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Training loss (MSE, scaled space)", ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(35)
        .y_label_area_size(55)
        .build_cartesian_2d(0..n as i32, 0.0..y_max * 1.05)
        .map_err(|e| anyhow!("building loss chart: {e}"))?;
    chart
        .configure_mesh()
        .x_desc("epoch")
        .y_desc("MSE")
        .draw()
        .map_err(|e| anyhow!("drawing mesh: {e}"))?;

    chart
        .draw_series(LineSeries::new(
            history.train_loss.iter().enumerate().map(|(i, &v)| (i as i32, v)),
            &BLUE,
        ))
        .map_err(|e| anyhow!("drawing train loss: {e}"))?
        .label("train")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 18, y)], BLUE));
    chart
        .draw_series(LineSeries::new(
            history.val_loss.iter().enumerate().map(|(i, &v)| (i as i32, v)),
            &RED,
        ))
        .map_err(|e| anyhow!("drawing val loss: {e}"))?
        .label("validation")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 18, y)], RED));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(|e| anyhow!("drawing legend: {e}"))?;
    root.present().map_err(|e| anyhow!("writing {}: {e}", path.display()))?;
    Ok(())
}

/// Overlay predicted and true glucose (mg/dL) over the first stretch of the
/// test partition, capped at one day of 5-minute buckets (288 points).
pub fn plot_pred_vs_true(y_true: &[f64], y_pred: &[f64], path: &Path) -> Result<()> {
    let take = y_true.len().min(y_pred.len()).min(288);
    if take == 0 {
        return Err(anyhow!("no test predictions to plot"));
    }
    let (lo, hi) = y_true[..take]
        .iter()
        .chain(&y_pred[..take])
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let pad = ((hi - lo) * 0.05).max(1.0);

    let root = BitMapBackend::new(path, (1000, 400)).into_drawing_area();
    root.fill(&WHITE).map_err(|e| anyhow!("filling canvas: {e}"))?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Predicted vs true glucose (test window)", ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(35)
        .y_label_area_size(55)
        .build_cartesian_2d(0..take as i32, (lo - pad)..(hi + pad))
        .map_err(|e| anyhow!("building overlay chart: {e}"))?;
    chart
        .configure_mesh()
        .x_desc("sample (5 min each)")
        .y_desc("mg/dL")
        .draw()
        .map_err(|e| anyhow!("drawing mesh: {e}"))?;

    chart
        .draw_series(LineSeries::new(
            y_true[..take].iter().enumerate().map(|(i, &v)| (i as i32, v)),
            &BLUE,
        ))
        .map_err(|e| anyhow!("drawing true series: {e}"))?
        .label("true")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 18, y)], BLUE));
    chart
        .draw_series(LineSeries::new(
            y_pred[..take].iter().enumerate().map(|(i, &v)| (i as i32, v)),
            &RED,
        ))
        .map_err(|e| anyhow!("drawing predicted series: {e}"))?
        .label("predicted")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 18, y)], RED));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(|e| anyhow!("drawing legend: {e}"))?;
    root.present().map_err(|e| anyhow!("writing {}: {e}", path.display()))?;
    Ok(())
}
