use std::fmt::Write as _;
use std::path::Path;

use glucast::config::PipelineConfig;
use glucast::data::loader;
use glucast::pipeline;
use glucast::scale::ScalerBundle;

/// Write a synthetic CGM export: one reading every 5 minutes, glucose on a
/// slow sinusoid, insulin recorded sporadically.
fn write_synthetic_csv(path: &Path, headers: &str, buckets: usize, offset: f64) {
    let mut out = String::from(headers);
    out.push('\n');
    for i in 0..buckets {
        let minutes = i * 5;
        let glucose = 120.0 + offset + 40.0 * ((i as f64) * 0.08).sin();
        let insulin = if i % 36 == 0 { "2.5" } else { "" };
        writeln!(
            out,
            "2023-04-01 {:02}:{:02}:00,{glucose:.1},{insulin}",
            8 + minutes / 60,
            minutes % 60
        )
        .unwrap();
    }
    std::fs::write(path, out).unwrap();
}

fn small_config(data_dir: &Path, out_dir: &Path) -> PipelineConfig {
    PipelineConfig {
        data_dir: data_dir.to_path_buf(),
        out_dir: out_dir.to_path_buf(),
        epochs: 5,
        batch_size: 32,
        ..PipelineConfig::default()
    }
}

#[test]
fn file_without_time_column_is_skipped_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    write_synthetic_csv(&dir.path().join("a.csv"), "time,glucose,insulin", 50, 0.0);
    write_synthetic_csv(&dir.path().join("c.csv"), "time,glucose,insulin", 50, 10.0);
    // No recognizable time column here.
    std::fs::write(dir.path().join("b.csv"), "patient_id,glucose\n1,120\n").unwrap();

    let series = loader::load_dir(dir.path(), 5, None).unwrap();
    assert_eq!(series.len(), 2);
}

#[test]
fn full_run_writes_every_artifact() {
    let data = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write_synthetic_csv(
        &data.path().join("patient_a.csv"),
        "Timestamp,GlucoseCGM (mg/dL),Bolus (U)",
        120,
        0.0,
    );
    write_synthetic_csv(
        &data.path().join("patient_b.csv"),
        "date,Sensor Glucose,insulin delivered",
        120,
        15.0,
    );

    let config = small_config(data.path(), out.path());
    let report = pipeline::run(&config).unwrap();

    // Two series of 120 buckets, 18 steps consumed per window.
    let expected_windows = 2 * (120 - 18);
    assert_eq!(
        report.examples_train + report.examples_val + report.examples_test,
        expected_windows
    );
    assert!(report.test_mae_mgdl.is_finite());

    for artifact in [
        "scaler_bundle.json",
        "regressor.json",
        "training_report.json",
        "loss_curves.png",
        "pred_vs_true.png",
    ] {
        assert!(out.path().join(artifact).exists(), "missing {artifact}");
    }

    // The bundle documents the feature order the snapshot form must follow.
    let bundle: ScalerBundle =
        serde_json::from_str(&std::fs::read_to_string(out.path().join("scaler_bundle.json")).unwrap())
            .unwrap();
    assert_eq!(
        bundle.features,
        ["glucose", "insulin", "carbohydrate", "heart_rate", "steps"]
    );
}

#[test]
fn prepare_respects_split_ordering() {
    let data = tempfile::tempdir().unwrap();
    write_synthetic_csv(&data.path().join("a.csv"), "time,glucose,insulin", 150, 0.0);

    let out = tempfile::tempdir().unwrap();
    let config = small_config(data.path(), out.path());
    let (_, windows, split) = pipeline::prepare(&config).unwrap();

    assert_eq!(split.train.len() + split.val.len() + split.test.len(), windows.len());
    assert!(split.train.end <= split.val.start || split.train.is_empty());
    assert_eq!(split.train.end, split.val.start);
    assert_eq!(split.val.end, split.test.start);
}

#[test]
fn zero_cadence_is_rejected_with_an_error() {
    let data = tempfile::tempdir().unwrap();
    write_synthetic_csv(&data.path().join("a.csv"), "time,glucose,insulin", 150, 0.0);

    let out = tempfile::tempdir().unwrap();
    let config = PipelineConfig {
        cadence_minutes: 0,
        ..small_config(data.path(), out.path())
    };
    let err = pipeline::run(&config).unwrap_err();
    assert!(err.to_string().contains("cadence"));
    let err = pipeline::prepare(&config).unwrap_err();
    assert!(err.to_string().contains("cadence"));
}

#[test]
fn too_small_corpus_aborts_with_insufficient_windows() {
    let data = tempfile::tempdir().unwrap();
    write_synthetic_csv(&data.path().join("a.csv"), "time,glucose,insulin", 30, 0.0);

    let out = tempfile::tempdir().unwrap();
    let config = small_config(data.path(), out.path());
    let err = pipeline::run(&config).unwrap_err();
    assert!(err.to_string().contains("windows"));
}
