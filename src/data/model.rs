use chrono::{Duration, NaiveDateTime};

// ---------------------------------------------------------------------------
// Feature order – the contract shared with the scaler bundle and the
// single-snapshot entry form
// ---------------------------------------------------------------------------

/// Number of feature channels per time bucket.
pub const FEATURE_COUNT: usize = 5;

/// Canonical feature order. Every `[f64; FEATURE_COUNT]` in the crate uses
/// this ordering, and the serialized scaler bundle records it verbatim.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] =
    ["glucose", "insulin", "carbohydrate", "heart_rate", "steps"];

/// Index of the glucose channel (the prediction target).
pub const GLUCOSE_IDX: usize = 0;

// ---------------------------------------------------------------------------
// Sample – one fully populated time bucket
// ---------------------------------------------------------------------------

/// One cadence bucket after resampling and gap-filling. Named fields rather
/// than an indexable map: the shape is fixed and checked at compile time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Blood glucose in mg/dL. Never missing in a retained bucket.
    pub glucose: f64,
    /// Insulin delivered (units).
    pub insulin: f64,
    /// Carbohydrate intake (grams).
    pub carbohydrate: f64,
    /// Heart rate (bpm).
    pub heart_rate: f64,
    /// Step count.
    pub steps: f64,
}

impl Sample {
    /// Flatten into the canonical feature order.
    pub fn to_array(self) -> [f64; FEATURE_COUNT] {
        [
            self.glucose,
            self.insulin,
            self.carbohydrate,
            self.heart_rate,
            self.steps,
        ]
    }

    pub fn from_array(v: [f64; FEATURE_COUNT]) -> Self {
        Sample {
            glucose: v[0],
            insulin: v[1],
            carbohydrate: v[2],
            heart_rate: v[3],
            steps: v[4],
        }
    }
}

// ---------------------------------------------------------------------------
// CanonicalSeries – one source file after resampling and gap-filling
// ---------------------------------------------------------------------------

/// One source file's data on the uniform grid. Bucket `i` covers the
/// interval starting at `start + i * cadence`; storing only the aligned
/// start makes strictly increasing timestamps and uniform bucket width
/// structural rather than checked.
#[derive(Debug, Clone)]
pub struct CanonicalSeries {
    /// Timestamp of the first bucket, aligned to a cadence boundary.
    pub start: NaiveDateTime,
    /// Bucket width in minutes.
    pub cadence_minutes: u32,
    /// One sample per bucket, contiguous from `start`.
    pub samples: Vec<Sample>,
}

impl CanonicalSeries {
    /// Timestamp of bucket `i`.
    pub fn timestamp(&self, i: usize) -> NaiveDateTime {
        self.start + Duration::minutes(self.cadence_minutes as i64 * i as i64)
    }

    /// Number of buckets.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn array_round_trip_preserves_feature_order() {
        let s = Sample {
            glucose: 110.0,
            insulin: 2.0,
            carbohydrate: 45.0,
            heart_rate: 72.0,
            steps: 13.0,
        };
        let arr = s.to_array();
        assert_eq!(arr, [110.0, 2.0, 45.0, 72.0, 13.0]);
        assert_eq!(Sample::from_array(arr), s);
    }

    #[test]
    fn bucket_timestamps_follow_cadence() {
        let start = NaiveDate::from_ymd_opt(2023, 4, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        let series = CanonicalSeries {
            start,
            cadence_minutes: 5,
            samples: vec![Sample::from_array([100.0; FEATURE_COUNT]); 3],
        };
        assert_eq!(series.timestamp(0), start);
        assert_eq!(series.timestamp(2), start + Duration::minutes(10));
    }
}
