use serde::{Deserialize, Serialize};

use crate::data::model::{CanonicalSeries, Sample, FEATURE_COUNT, FEATURE_NAMES, GLUCOSE_IDX};

/// One scaled series: the canonical grid with every feature mapped into the
/// corpus-wide [0, 1] range, per-series structure preserved for windowing.
pub type ScaledSeries = Vec<[f64; FEATURE_COUNT]>;

// ---------------------------------------------------------------------------
// GlobalScaler – corpus-wide min-max map
// ---------------------------------------------------------------------------

/// Per-feature linear min-max scaler fitted once over the whole corpus and
/// immutable afterwards.
///
/// The fit deliberately covers the full corpus, including the time ranges
/// that later fall into the validation and test partitions; downstream
/// numbers depend on this exact range.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalScaler {
    min: [f64; FEATURE_COUNT],
    max: [f64; FEATURE_COUNT],
}

impl GlobalScaler {
    /// Fit over the concatenation of all series, in file order then time
    /// order. Returns `None` when the corpus holds no samples at all.
    pub fn fit(corpus: &[CanonicalSeries]) -> Option<GlobalScaler> {
        let mut min = [f64::INFINITY; FEATURE_COUNT];
        let mut max = [f64::NEG_INFINITY; FEATURE_COUNT];
        let mut seen = false;

        for series in corpus {
            for sample in &series.samples {
                seen = true;
                for (f, v) in sample.to_array().into_iter().enumerate() {
                    min[f] = min[f].min(v);
                    max[f] = max[f].max(v);
                }
            }
        }
        seen.then_some(GlobalScaler { min, max })
    }

    /// Observed width of a feature's range; a zero-width range divides by 1
    /// so constant features map to 0 and invert back to the constant.
    fn span(&self, f: usize) -> f64 {
        let d = self.max[f] - self.min[f];
        if d == 0.0 {
            1.0
        } else {
            d
        }
    }

    /// Map one feature vector into scaled space.
    pub fn transform(&self, v: [f64; FEATURE_COUNT]) -> [f64; FEATURE_COUNT] {
        std::array::from_fn(|f| (v[f] - self.min[f]) / self.span(f))
    }

    /// Linear inverse of [`transform`](Self::transform).
    pub fn inverse(&self, v: [f64; FEATURE_COUNT]) -> [f64; FEATURE_COUNT] {
        std::array::from_fn(|f| v[f] * self.span(f) + self.min[f])
    }

    /// Scale one series, keeping its per-series structure.
    pub fn transform_series(&self, series: &CanonicalSeries) -> ScaledSeries {
        series
            .samples
            .iter()
            .map(|s| self.transform(s.to_array()))
            .collect()
    }

    /// Recover a physical-units glucose value from a scaled one.
    ///
    /// The min-max map is defined jointly over the full feature vector, so a
    /// single feature is inverted by embedding it into an all-zero vector,
    /// applying the full inverse, and reading its position back out.
    pub fn inverse_glucose(&self, scaled: f64) -> f64 {
        let mut dummy = [0.0; FEATURE_COUNT];
        dummy[GLUCOSE_IDX] = scaled;
        self.inverse(dummy)[GLUCOSE_IDX]
    }

    /// Scale a single snapshot from the data-entry collaborator. The caller
    /// must fill the [`Sample`] fields in their natural units; the returned
    /// vector follows the canonical feature order.
    pub fn scale_snapshot(&self, snapshot: Sample) -> [f64; FEATURE_COUNT] {
        self.transform(snapshot.to_array())
    }

    /// The serializable form handed to inference-time collaborators.
    pub fn bundle(&self) -> ScalerBundle {
        ScalerBundle {
            features: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            min: self.min,
            max: self.max,
        }
    }
}

// ---------------------------------------------------------------------------
// ScalerBundle – the persisted artifact
// ---------------------------------------------------------------------------

/// Persisted scaler: per-feature min/max plus the ordered feature list. The
/// single-snapshot entry form must build its vector in exactly this feature
/// order and scale it with these bounds before invoking the regressor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalerBundle {
    pub features: Vec<String>,
    pub min: [f64; FEATURE_COUNT],
    pub max: [f64; FEATURE_COUNT],
}

impl ScalerBundle {
    pub fn scaler(&self) -> GlobalScaler {
        GlobalScaler {
            min: self.min,
            max: self.max,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, NaiveDateTime};

    fn series(samples: Vec<[f64; FEATURE_COUNT]>) -> CanonicalSeries {
        CanonicalSeries {
            start: unix_start(),
            cadence_minutes: 5,
            samples: samples.into_iter().map(Sample::from_array).collect(),
        }
    }

    fn unix_start() -> NaiveDateTime {
        DateTime::UNIX_EPOCH.naive_utc()
    }

    #[test]
    fn fit_spans_the_whole_corpus() {
        let a = series(vec![[70.0, 0.0, 0.0, 60.0, 0.0]]);
        let b = series(vec![[180.0, 5.0, 40.0, 90.0, 200.0]]);
        let scaler = GlobalScaler::fit(&[a, b]).unwrap();
        assert_eq!(scaler.min[0], 70.0);
        assert_eq!(scaler.max[0], 180.0);
        assert_eq!(scaler.max[4], 200.0);
    }

    #[test]
    fn fit_on_empty_corpus_yields_none() {
        assert!(GlobalScaler::fit(&[]).is_none());
        assert!(GlobalScaler::fit(&[series(vec![])]).is_none());
    }

    #[test]
    fn known_range_transforms_to_expected_fraction() {
        let s = series(vec![
            [70.0, 0.0, 0.0, 0.0, 0.0],
            [180.0, 1.0, 1.0, 1.0, 1.0],
        ]);
        let scaler = GlobalScaler::fit(std::slice::from_ref(&s)).unwrap();
        let scaled = scaler.transform([110.0, 0.0, 0.0, 0.0, 0.0]);
        assert!((scaled[0] - 0.36363636).abs() < 1e-6);
        assert!((scaler.inverse_glucose(scaled[0]) - 110.0).abs() < 1e-6);
    }

    #[test]
    fn transform_inverse_round_trip() {
        let s = series(vec![
            [70.0, 0.0, 10.0, 55.0, 0.0],
            [180.0, 6.0, 80.0, 120.0, 400.0],
        ]);
        let scaler = GlobalScaler::fit(std::slice::from_ref(&s)).unwrap();
        let v = [123.4, 2.5, 33.0, 71.0, 120.0];
        let back = scaler.inverse(scaler.transform(v));
        for (a, b) in v.iter().zip(back.iter()) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn constant_feature_maps_to_zero_and_back() {
        let s = series(vec![
            [100.0, 3.0, 0.0, 0.0, 0.0],
            [120.0, 3.0, 0.0, 0.0, 0.0],
        ]);
        let scaler = GlobalScaler::fit(std::slice::from_ref(&s)).unwrap();
        let scaled = scaler.transform([110.0, 3.0, 0.0, 0.0, 0.0]);
        assert_eq!(scaled[1], 0.0);
        assert_eq!(scaler.inverse(scaled)[1], 3.0);
    }

    #[test]
    fn bundle_round_trips_through_json() {
        let s = series(vec![
            [70.0, 0.0, 0.0, 60.0, 0.0],
            [180.0, 5.0, 40.0, 90.0, 200.0],
        ]);
        let scaler = GlobalScaler::fit(std::slice::from_ref(&s)).unwrap();
        let json = serde_json::to_string(&scaler.bundle()).unwrap();
        let bundle: ScalerBundle = serde_json::from_str(&json).unwrap();
        assert_eq!(bundle.features[0], "glucose");
        assert_eq!(bundle.scaler(), scaler);
    }
}
