use std::ops::Range;

use crate::error::PipelineError;

// ---------------------------------------------------------------------------
// Chronological train / validation / test split
// ---------------------------------------------------------------------------

/// Three contiguous, non-overlapping index ranges over the concatenated
/// window sequence: train prefix, validation middle, test suffix. Never
/// shuffled; window order is the chronology.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub train: Range<usize>,
    pub val: Range<usize>,
    pub test: Range<usize>,
}

impl Split {
    /// Cut points at `floor(train_ratio * n)` and
    /// `floor((train_ratio + val_ratio) * n)`. Fails when fewer than
    /// `min_windows` examples exist in total.
    pub fn plan(
        n: usize,
        train_ratio: f64,
        val_ratio: f64,
        min_windows: usize,
    ) -> Result<Split, PipelineError> {
        if n < min_windows {
            return Err(PipelineError::InsufficientWindows {
                found: n,
                required: min_windows,
            });
        }
        let i1 = (train_ratio * n as f64) as usize;
        let i2 = ((train_ratio + val_ratio) * n as f64) as usize;
        Ok(Split {
            train: 0..i1,
            val: i1..i2,
            test: i2..n,
        })
    }
}
