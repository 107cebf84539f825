use std::path::PathBuf;

// ---------------------------------------------------------------------------
// Pipeline configuration
// ---------------------------------------------------------------------------

/// Everything one run needs, constructed once and passed explicitly into the
/// pipeline entry point. Never read from ambient global state.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directory of delimited source files.
    pub data_dir: PathBuf,
    /// Directory for output artifacts (bundle, report, images).
    pub out_dir: PathBuf,
    /// Resampling bucket width in minutes.
    pub cadence_minutes: u32,
    /// Lookback window length in minutes.
    pub past_minutes: u32,
    /// Forecast horizon in minutes.
    pub horizon_minutes: u32,
    /// Fraction of windows in the training prefix.
    pub train_ratio: f64,
    /// Fraction of windows in the validation middle.
    pub val_ratio: f64,
    /// Minimum viable total window count.
    pub min_windows: usize,
    /// Training epochs for the regressor.
    pub epochs: usize,
    /// Mini-batch size for the regressor.
    pub batch_size: usize,
    /// Optional cap on the number of source files (useful for smoke runs).
    pub max_files: Option<usize>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            data_dir: PathBuf::from("data"),
            out_dir: PathBuf::from("outputs"),
            cadence_minutes: 5,
            past_minutes: 60,
            horizon_minutes: 30,
            train_ratio: 0.7,
            val_ratio: 0.15,
            min_windows: 100,
            epochs: 100,
            batch_size: 256,
            max_files: None,
        }
    }
}
