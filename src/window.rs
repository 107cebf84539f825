use crate::data::model::{FEATURE_COUNT, GLUCOSE_IDX};
use crate::scale::ScaledSeries;

// ---------------------------------------------------------------------------
// Window – one supervised training example
// ---------------------------------------------------------------------------

/// A fixed-length history slice paired with the glucose value a fixed number
/// of buckets ahead. All values are in scaled space.
#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    /// Exactly `past_steps` rows of the five features, oldest first.
    pub input: Vec<[f64; FEATURE_COUNT]>,
    /// Scaled glucose `future_steps` buckets after the last input row.
    pub target: f64,
}

/// History length in buckets for a lookback of `past_minutes`.
pub fn past_steps(past_minutes: u32, cadence_minutes: u32) -> usize {
    ((past_minutes / cadence_minutes) as usize).max(1)
}

/// Forecast distance in buckets for a horizon of `horizon_minutes`.
pub fn future_steps(horizon_minutes: u32, cadence_minutes: u32) -> usize {
    ((horizon_minutes / cadence_minutes) as usize).max(1)
}

/// Slide over every series and concatenate the results, preserving series
/// order and in-series time order. This concatenation order is what the
/// split stage treats as chronological.
pub fn build_windows(series: &[ScaledSeries], past: usize, future: usize) -> Vec<Window> {
    series
        .iter()
        .flat_map(|s| series_windows(s, past, future))
        .collect()
}

/// Windows for one series. For each anchor `i` in `[past, len - future)` the
/// input is rows `[i - past, i)` and the target is the glucose at
/// `i + future`. A series shorter than `past + future + 1` contributes
/// nothing; that is expected, not an error.
fn series_windows(series: &ScaledSeries, past: usize, future: usize) -> Vec<Window> {
    if series.len() < past + future + 1 {
        return Vec::new();
    }
    (past..series.len() - future)
        .map(|i| Window {
            input: series[i - past..i].to_vec(),
            target: series[i + future][GLUCOSE_IDX],
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Series whose glucose channel counts up from 0, one unit per bucket.
    fn counting_series(len: usize) -> ScaledSeries {
        (0..len)
            .map(|i| {
                let mut v = [0.0; FEATURE_COUNT];
                v[GLUCOSE_IDX] = i as f64;
                v
            })
            .collect()
    }

    #[test]
    fn step_counts_floor_and_clamp_to_one() {
        assert_eq!(past_steps(60, 5), 12);
        assert_eq!(future_steps(30, 5), 6);
        assert_eq!(past_steps(3, 5), 1);
        assert_eq!(future_steps(0, 5), 1);
    }

    #[test]
    fn twenty_buckets_past12_future6_yield_two_windows() {
        let s = counting_series(20);
        let windows = series_windows(&s, 12, 6);
        assert_eq!(windows.len(), 2);
        // Anchors 12 and 13: inputs [0,12) and [1,13), targets at 18 and 19.
        assert_eq!(windows[0].input.len(), 12);
        assert_eq!(windows[0].input[0][GLUCOSE_IDX], 0.0);
        assert_eq!(windows[0].target, 18.0);
        assert_eq!(windows[1].input[0][GLUCOSE_IDX], 1.0);
        assert_eq!(windows[1].target, 19.0);
    }

    #[test]
    fn window_count_law() {
        for len in 0..40 {
            let s = counting_series(len);
            let expected = len.saturating_sub(12 + 6);
            assert_eq!(series_windows(&s, 12, 6).len(), expected, "len={len}");
        }
    }

    #[test]
    fn short_series_contribute_nothing() {
        // Exactly past + future buckets: one too few.
        let s = counting_series(18);
        assert!(series_windows(&s, 12, 6).is_empty());
    }

    #[test]
    fn concatenation_preserves_series_then_time_order() {
        let a = counting_series(20);
        let b: ScaledSeries = counting_series(20)
            .into_iter()
            .map(|mut v| {
                v[GLUCOSE_IDX] += 100.0;
                v
            })
            .collect();
        let windows = build_windows(&[a, b], 12, 6);
        assert_eq!(windows.len(), 4);
        assert_eq!(windows[0].target, 18.0);
        assert_eq!(windows[1].target, 19.0);
        assert_eq!(windows[2].target, 118.0);
        assert_eq!(windows[3].target, 119.0);
    }
}
