use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime};
use log::{debug, info, warn};

use super::model::{CanonicalSeries, Sample, FEATURE_COUNT, GLUCOSE_IDX};
use super::schema::{self, SchemaMap};
use super::timestamp;
use crate::error::{LoadError, PipelineError};

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load every `*.csv` file under `dir`, in sorted filename order, one
/// canonical series per file.
///
/// Per-file failures (missing time column, unparseable timestamps, CSV
/// errors) are logged with the filename and skipped; the batch proceeds.
/// Zero usable series aborts the run with [`PipelineError::NoValidSeries`].
pub fn load_dir(
    dir: &Path,
    cadence_minutes: u32,
    max_files: Option<usize>,
) -> Result<Vec<CanonicalSeries>> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("reading data directory {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("csv"))
        })
        .collect();
    paths.sort();
    if let Some(cap) = max_files {
        paths.truncate(cap);
    }

    info!("loading {} CSV files from {}", paths.len(), dir.display());

    let mut series = Vec::new();
    for path in &paths {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("<non-utf8>");
        match load_series(path, cadence_minutes) {
            Ok(s) if s.is_empty() => {
                warn!("{name}: no glucose channel, series is empty");
                series.push(s);
            }
            Ok(s) => {
                debug!("{name}: {} buckets from {}", s.len(), s.start);
                series.push(s);
            }
            Err(e) => warn!("skipping {name}: {e}"),
        }
    }

    if series.is_empty() {
        return Err(PipelineError::NoValidSeries {
            dir: dir.to_path_buf(),
        }
        .into());
    }
    Ok(series)
}

/// Load one file: resolve its schema, parse and sort timestamps, resample
/// onto the cadence grid, and gap-fill every channel.
pub fn load_series(path: &Path, cadence_minutes: u32) -> Result<CanonicalSeries, LoadError> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let schema = schema::resolve(&headers)?;

    // Pull the raw rows: the time cell as text, the channels as optional
    // numbers (a cell that does not parse as f64 counts as missing).
    let mut time_cells: Vec<String> = Vec::new();
    let mut channel_rows: Vec<[Option<f64>; FEATURE_COUNT]> = Vec::new();
    for record in reader.records() {
        let record = record?;
        time_cells.push(record.get(schema.time).unwrap_or("").to_string());
        channel_rows.push(channel_values(&record, &schema));
    }

    let parsed = timestamp::parse_column(&time_cells)?;

    // Drop rows whose timestamp neither stage could read.
    let mut rows: Vec<(NaiveDateTime, [Option<f64>; FEATURE_COUNT])> = parsed
        .into_iter()
        .zip(channel_rows)
        .filter_map(|(t, vals)| t.map(|t| (t, vals)))
        .collect();
    let dropped = time_cells.len() - rows.len();
    if dropped > 0 {
        debug!("{}: dropped {dropped} rows with unparseable timestamps", path.display());
    }

    rows.sort_by_key(|(t, _)| *t);

    Ok(resample(&rows, cadence_minutes))
}

/// Per-role channel extraction for one record, in canonical feature order.
fn channel_values(record: &csv::StringRecord, schema: &SchemaMap) -> [Option<f64>; FEATURE_COUNT] {
    let cell = |idx: Option<usize>| -> Option<f64> {
        idx.and_then(|i| record.get(i))
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite())
    };
    [
        cell(schema.glucose),
        cell(schema.insulin),
        cell(schema.carbohydrate),
        cell(schema.heart_rate),
        cell(schema.steps),
    ]
}

// ---------------------------------------------------------------------------
// Resampling and gap-filling
// ---------------------------------------------------------------------------

/// Average the sorted raw rows into fixed-width buckets spanning first to
/// last observation, then fill the gaps: glucose by bidirectional linear
/// interpolation, the other channels by forward-fill then zero.
fn resample(
    rows: &[(NaiveDateTime, [Option<f64>; FEATURE_COUNT])],
    cadence_minutes: u32,
) -> CanonicalSeries {
    let bucket_secs = cadence_minutes as i64 * 60;
    let empty = |start| CanonicalSeries {
        start,
        cadence_minutes,
        samples: Vec::new(),
    };
    let Some(((first_t, _), (last_t, _))) = rows.first().zip(rows.last()) else {
        return empty(DateTime::UNIX_EPOCH.naive_utc());
    };

    let first_bucket = first_t.and_utc().timestamp().div_euclid(bucket_secs);
    let last_bucket = last_t.and_utc().timestamp().div_euclid(bucket_secs);
    let n_buckets = (last_bucket - first_bucket + 1) as usize;
    let start = DateTime::from_timestamp(first_bucket * bucket_secs, 0)
        .expect("bucket-aligned timestamp in range")
        .naive_utc();

    // Per-bucket per-channel mean.
    let mut sums = vec![[0.0f64; FEATURE_COUNT]; n_buckets];
    let mut counts = vec![[0u32; FEATURE_COUNT]; n_buckets];
    for (t, vals) in rows {
        let b = (t.and_utc().timestamp().div_euclid(bucket_secs) - first_bucket) as usize;
        for (f, v) in vals.iter().enumerate() {
            if let Some(v) = v {
                sums[b][f] += v;
                counts[b][f] += 1;
            }
        }
    }
    let mut channels: Vec<Vec<Option<f64>>> = (0..FEATURE_COUNT)
        .map(|f| {
            (0..n_buckets)
                .map(|b| (counts[b][f] > 0).then(|| sums[b][f] / counts[b][f] as f64))
                .collect()
        })
        .collect();

    interpolate_bidirectional(&mut channels[GLUCOSE_IDX]);
    for channel in channels.iter_mut().skip(1) {
        forward_fill_then_zero(channel);
    }

    // A bucket still missing glucose means the whole channel was absent;
    // interpolation otherwise reaches every bucket, so this drops all or none.
    let samples = (0..n_buckets)
        .filter(|&b| channels[GLUCOSE_IDX][b].is_some())
        .map(|b| {
            let mut v = [0.0; FEATURE_COUNT];
            for (f, channel) in channels.iter().enumerate() {
                v[f] = channel[b].unwrap_or(0.0);
            }
            Sample::from_array(v)
        })
        .collect();

    CanonicalSeries {
        start,
        cadence_minutes,
        samples,
    }
}

/// Linear interpolation between known neighbours; buckets before the first
/// or after the last known value take the nearest known value. A channel
/// with no known value at all is left untouched.
fn interpolate_bidirectional(channel: &mut [Option<f64>]) {
    let known: Vec<usize> = channel
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.map(|_| i))
        .collect();
    if known.is_empty() {
        return;
    }

    for i in 0..channel.len() {
        if channel[i].is_some() {
            continue;
        }
        let next = known.partition_point(|&k| k < i);
        channel[i] = Some(match (next.checked_sub(1), known.get(next)) {
            (Some(p), Some(&n)) => {
                let (p, n) = (known[p], n);
                let lo = channel[p].unwrap();
                let hi = channel[n].unwrap();
                lo + (hi - lo) * (i - p) as f64 / (n - p) as f64
            }
            (None, Some(&n)) => channel[n].unwrap(),
            (Some(p), None) => channel[known[p]].unwrap(),
            (None, None) => unreachable!("known is non-empty"),
        });
    }
}

/// Forward-fill from the most recent known bucket; any leading gap becomes
/// zero (no insulin/carbs/steps recorded means none happened).
fn forward_fill_then_zero(channel: &mut [Option<f64>]) {
    let mut last = 0.0;
    for v in channel.iter_mut() {
        match v {
            Some(x) => last = *x,
            None => *v = Some(last),
        }
    }
}
