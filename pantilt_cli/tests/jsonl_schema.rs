use assert_cmd::prelude::*;
use rstest::rstest;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::tempdir;

fn write_valid_config(dir: &tempfile::TempDir) -> PathBuf {
    let toml = r#"
[capture]
width = 640
height = 480

[settle]
settle_ms = 40

[runner]
frame_rate_hz = 200
"#;
    let path = dir.path().join("cfg.toml");
    fs::write(&path, toml).unwrap();
    path
}

fn events(text: &str, kind: &str) -> Vec<serde_json::Value> {
    text.lines()
        .filter_map(|l| serde_json::from_str::<serde_json::Value>(l).ok())
        .filter(|v| v["event"] == kind)
        .collect()
}

/// Validate the JSONL schema for a successful tracking run.
#[rstest]
fn jsonl_track_schema() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);
    let script = dir.path().join("script.csv");
    // Subject 20px right of center at 640x480: scaled offset 40 > dead zone.
    fs::write(
        &script,
        "frame,x,y,width,height\n0,330,230,20,20\n0,0,0,4,4\n2,,,,\n",
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("pantilt").unwrap();
    cmd.arg("--json")
        .arg("--log-level")
        .arg("error")
        .arg("--config")
        .arg(&cfg)
        .arg("track")
        .arg("--script")
        .arg(&script);

    let out = cmd.assert().success().get_output().stdout.clone();
    let stdout = String::from_utf8_lossy(&out);

    let frames = events(&stdout, "frame");
    assert_eq!(frames.len(), 3, "stdout was: {stdout}");
    for (i, f) in frames.iter().enumerate() {
        assert_eq!(f["frame"], (i + 1) as u64);
        for key in ["regions", "target", "moved", "in_motion", "pan", "tilt"] {
            assert!(f.get(key).is_some(), "missing {key} in {f}");
        }
    }

    let first = &frames[0];
    assert_eq!(first["regions"].as_array().map(Vec::len), Some(2));
    assert_eq!(first["target"]["x"], 340.0);
    assert_eq!(first["target"]["area"], 400);
    assert_eq!(first["moved"], true);
    assert_eq!(first["in_motion"], true);
    let pan = first["pan"].as_f64().unwrap();
    assert!((pan - (50.0 + 0.0933 * 40.0 + 0.0864)).abs() < 1e-9, "pan={pan}");
    assert_eq!(first["tilt"], 50.0);

    // After the move the detector is relearning and nothing is targeted.
    assert!(frames[1]["target"].is_null());
    assert_eq!(frames[1]["moved"], false);

    let summary = events(&stdout, "summary");
    assert_eq!(summary.len(), 1);
    let s = &summary[0];
    assert_eq!(s["frames"], 3);
    assert_eq!(s["detections"], 1);
    assert_eq!(s["moves"], 1);
    assert_eq!(s["settles"], 1);
    assert_eq!(s["stopped_early"], false);
}

#[rstest]
fn jsonl_error_schema() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);
    let script = dir.path().join("script.csv");
    fs::write(&script, "frame,x,y,width,height\n0,-10,0,20,20\n").unwrap();

    let mut cmd = Command::cargo_bin("pantilt").unwrap();
    cmd.arg("--json")
        .arg("--log-level")
        .arg("error")
        .arg("--config")
        .arg(&cfg)
        .arg("track")
        .arg("--script")
        .arg(&script);

    let out = cmd.assert().code(2).get_output().stderr.clone();
    let stderr = String::from_utf8_lossy(&out);
    let errors = events(&stderr, "error");
    assert_eq!(errors.len(), 1, "stderr was: {stderr}");
    assert_eq!(errors[0]["reason"], "Detector");
    assert_eq!(errors[0]["exit_code"], 2);
    assert!(errors[0]["message"].as_str().is_some());
}

#[rstest]
fn jsonl_self_check() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    let mut cmd = Command::cargo_bin("pantilt").unwrap();
    cmd.arg("--json")
        .arg("--log-level")
        .arg("error")
        .arg("--config")
        .arg(&cfg)
        .arg("self-check");

    let out = cmd.assert().success().get_output().stdout.clone();
    let stdout = String::from_utf8_lossy(&out);
    let checks = events(&stdout, "self_check");
    assert_eq!(checks.len(), 1, "stdout was: {stdout}");
    assert_eq!(checks[0]["ok"], true);
    assert!(checks[0]["pan"].as_f64().unwrap() > 50.0);
}
