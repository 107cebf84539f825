use serde::{Deserialize, Serialize};

use crate::scale::GlobalScaler;

// ---------------------------------------------------------------------------
// Evaluation in physical units
// ---------------------------------------------------------------------------

/// Test-set accuracy in physical units (mg/dL).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    /// Mean absolute error.
    pub mae: f64,
    /// Root mean squared error.
    pub rmse: f64,
    /// Coefficient of determination.
    pub r2: f64,
}

/// Inverse-transform predicted and true targets out of scaled space, then
/// score them. Both slices must have the same length.
pub fn evaluate(scaler: &GlobalScaler, predicted: &[f64], truth: &[f64]) -> Metrics {
    debug_assert_eq!(predicted.len(), truth.len());
    let y_pred: Vec<f64> = predicted.iter().map(|&v| scaler.inverse_glucose(v)).collect();
    let y_true: Vec<f64> = truth.iter().map(|&v| scaler.inverse_glucose(v)).collect();

    Metrics {
        mae: mean_absolute_error(&y_true, &y_pred),
        rmse: root_mean_squared_error(&y_true, &y_pred),
        r2: r_squared(&y_true, &y_pred),
    }
}

fn mean_absolute_error(y_true: &[f64], y_pred: &[f64]) -> f64 {
    let n = y_true.len().max(1) as f64;
    y_true
        .iter()
        .zip(y_pred)
        .map(|(t, p)| (t - p).abs())
        .sum::<f64>()
        / n
}

fn root_mean_squared_error(y_true: &[f64], y_pred: &[f64]) -> f64 {
    let n = y_true.len().max(1) as f64;
    (y_true
        .iter()
        .zip(y_pred)
        .map(|(t, p)| (t - p).powi(2))
        .sum::<f64>()
        / n)
        .sqrt()
}

/// `1 - SS_res / SS_tot`. A constant truth vector has no variance to
/// explain: perfect predictions score 1, anything else 0.
fn r_squared(y_true: &[f64], y_pred: &[f64]) -> f64 {
    let n = y_true.len().max(1) as f64;
    let mean = y_true.iter().sum::<f64>() / n;
    let ss_tot: f64 = y_true.iter().map(|t| (t - mean).powi(2)).sum();
    let ss_res: f64 = y_true
        .iter()
        .zip(y_pred)
        .map(|(t, p)| (t - p).powi(2))
        .sum();
    if ss_tot == 0.0 {
        return if ss_res == 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_predictions() {
        let y = [100.0, 120.0, 140.0];
        assert_eq!(mean_absolute_error(&y, &y), 0.0);
        assert_eq!(root_mean_squared_error(&y, &y), 0.0);
        assert_eq!(r_squared(&y, &y), 1.0);
    }

    #[test]
    fn known_error_values() {
        let y_true = [100.0, 120.0];
        let y_pred = [110.0, 110.0];
        assert!((mean_absolute_error(&y_true, &y_pred) - 10.0).abs() < 1e-12);
        assert!((root_mean_squared_error(&y_true, &y_pred) - 10.0).abs() < 1e-12);
        // SS_res = 200, SS_tot = 200 → R² = 0.
        assert!(r_squared(&y_true, &y_pred).abs() < 1e-12);
    }

    #[test]
    fn constant_truth_scores_zero_unless_exact() {
        let y_true = [100.0, 100.0];
        assert_eq!(r_squared(&y_true, &[100.0, 100.0]), 1.0);
        assert_eq!(r_squared(&y_true, &[90.0, 110.0]), 0.0);
    }
}
