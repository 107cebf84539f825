use serde::{Deserialize, Serialize};

use crate::window::Window;

// ---------------------------------------------------------------------------
// Regressor – the opaque trainable function
// ---------------------------------------------------------------------------

/// Per-epoch mean squared error in scaled space; feeds the loss-curve image.
#[derive(Debug, Clone, Default)]
pub struct TrainHistory {
    pub train_loss: Vec<f64>,
    pub val_loss: Vec<f64>,
}

/// The trainable function mapping a window to a scalar glucose prediction.
/// The pipeline only sees this seam; the architecture behind it is
/// interchangeable.
pub trait Regressor {
    /// Fit on the training windows, tracking validation loss per epoch.
    fn fit(
        &mut self,
        train: &[Window],
        val: &[Window],
        epochs: usize,
        batch_size: usize,
    ) -> TrainHistory;

    /// Predict the scaled glucose target for one window.
    fn predict(&self, window: &Window) -> f64;
}

// ---------------------------------------------------------------------------
// Baseline: mini-batch SGD linear model over the flattened window
// ---------------------------------------------------------------------------

/// Linear model on the flattened `past_steps × 5` input, trained with
/// mini-batch gradient descent. Zero-initialized, no shuffling: runs are
/// bit-for-bit reproducible. The serialized form is the trained-regressor
/// artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearRegressor {
    weights: Vec<f64>,
    bias: f64,
    learning_rate: f64,
}

impl LinearRegressor {
    pub fn new(input_len: usize) -> Self {
        LinearRegressor {
            weights: vec![0.0; input_len],
            bias: 0.0,
            learning_rate: 0.05,
        }
    }

    fn forward(&self, window: &Window) -> f64 {
        let dot: f64 = window
            .input
            .iter()
            .flatten()
            .zip(&self.weights)
            .map(|(x, w)| x * w)
            .sum();
        dot + self.bias
    }

    fn mse(&self, windows: &[Window]) -> f64 {
        if windows.is_empty() {
            return 0.0;
        }
        windows
            .iter()
            .map(|w| (self.forward(w) - w.target).powi(2))
            .sum::<f64>()
            / windows.len() as f64
    }

    fn step(&mut self, batch: &[Window]) {
        let n = batch.len() as f64;
        let mut grad_w = vec![0.0; self.weights.len()];
        let mut grad_b = 0.0;
        for w in batch {
            let err = self.forward(w) - w.target;
            for (g, x) in grad_w.iter_mut().zip(w.input.iter().flatten()) {
                *g += err * x;
            }
            grad_b += err;
        }
        let scale = 2.0 * self.learning_rate / n;
        for (w, g) in self.weights.iter_mut().zip(&grad_w) {
            *w -= scale * g;
        }
        self.bias -= scale * grad_b;
    }
}

impl Regressor for LinearRegressor {
    fn fit(
        &mut self,
        train: &[Window],
        val: &[Window],
        epochs: usize,
        batch_size: usize,
    ) -> TrainHistory {
        let batch_size = batch_size.max(1);
        let mut history = TrainHistory::default();
        for _ in 0..epochs {
            for batch in train.chunks(batch_size) {
                self.step(batch);
            }
            history.train_loss.push(self.mse(train));
            history.val_loss.push(self.mse(val));
        }
        history
    }

    fn predict(&self, window: &Window) -> f64 {
        self.forward(window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{FEATURE_COUNT, GLUCOSE_IDX};

    /// Windows where the target equals the last input row's glucose value.
    fn persistence_windows(n: usize, past: usize) -> Vec<Window> {
        (0..n)
            .map(|i| {
                let level = 0.3 + 0.4 * ((i as f64 * 0.7).sin().abs());
                let mut row = [0.0; FEATURE_COUNT];
                row[GLUCOSE_IDX] = level;
                Window {
                    input: vec![row; past],
                    target: level,
                }
            })
            .collect()
    }

    #[test]
    fn learns_the_persistence_relation() {
        let windows = persistence_windows(64, 4);
        let mut model = LinearRegressor::new(4 * FEATURE_COUNT);
        let history = model.fit(&windows, &windows, 200, 16);
        let last = *history.train_loss.last().unwrap();
        assert!(last < 1e-3, "final train MSE {last}");
    }

    #[test]
    fn loss_history_has_one_entry_per_epoch() {
        let windows = persistence_windows(16, 2);
        let mut model = LinearRegressor::new(2 * FEATURE_COUNT);
        let history = model.fit(&windows, &[], 7, 4);
        assert_eq!(history.train_loss.len(), 7);
        assert_eq!(history.val_loss.len(), 7);
    }

    #[test]
    fn training_is_deterministic() {
        let windows = persistence_windows(32, 3);
        let mut a = LinearRegressor::new(3 * FEATURE_COUNT);
        let mut b = LinearRegressor::new(3 * FEATURE_COUNT);
        a.fit(&windows, &[], 10, 8);
        b.fit(&windows, &[], 10, 8);
        assert_eq!(a.predict(&windows[0]), b.predict(&windows[0]));
    }
}
