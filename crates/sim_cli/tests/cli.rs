//! Black-box runs of the `seatsim` binary against the fixtures in demos/.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;

fn demos() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos")
}

fn seatsim() -> Command {
    let mut cmd = Command::cargo_bin("seatsim").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

fn demo_args(cmd: &mut Command, out: &Path) {
    cmd.arg("--reference")
        .arg(demos().join("reference.json"))
        .arg("--scenario")
        .arg(demos().join("scenario.json"))
        .arg("--out")
        .arg(out);
}

fn read_result(dir: &Path) -> serde_json::Value {
    serde_json::from_slice(&fs::read(dir.join("result.json")).unwrap()).unwrap()
}

#[test]
fn run_writes_result_and_prints_digest() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = seatsim();
    demo_args(&mut cmd, dir.path());
    cmd.assert()
        .success()
        .stdout(predicate::str::is_match(r"^[0-9a-f]{64}  .*result\.json\n$").unwrap());

    let v = read_result(dir.path());
    let seats: u64 = v["national_seat_totals"]
        .as_object()
        .unwrap()
        .values()
        .map(|s| s.as_u64().unwrap())
        .sum();
    assert_eq!(seats, 24);
    assert_eq!(v["district_results"].as_array().unwrap().len(), 4);
    assert_eq!(v["metrics"]["majority_threshold"], 12);
    assert!(v["metrics"]["coalitions"].as_array().unwrap().len() <= 5);
}

#[test]
fn identical_inputs_identical_bytes() {
    let (a, b) = (tempfile::tempdir().unwrap(), tempfile::tempdir().unwrap());
    for dir in [&a, &b] {
        let mut cmd = seatsim();
        demo_args(&mut cmd, dir.path());
        cmd.arg("--quiet").assert().success();
    }
    assert_eq!(
        fs::read(a.path().join("result.json")).unwrap(),
        fs::read(b.path().join("result.json")).unwrap()
    );
}

#[test]
fn overrides_apply() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = seatsim();
    demo_args(&mut cmd, dir.path());
    cmd.args(["--swing", "proportional-bounded", "--seats", "4"]).assert().success();

    let v = read_result(dir.path());
    assert_eq!(v["swing_type"], "proportional-bounded");
    assert_eq!(v["seats_per_district"], 4);
    assert_eq!(v["metrics"]["total_seats"], 16);
}

#[test]
fn validate_only_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = seatsim();
    demo_args(&mut cmd, dir.path());
    cmd.arg("--validate-only")
        .assert()
        .success()
        .stderr(predicate::str::contains("validate-only: inputs OK"));
    assert!(!dir.path().join("result.json").exists());
}

#[test]
fn missing_input_is_io_exit() {
    let dir = tempfile::tempdir().unwrap();
    seatsim()
        .arg("--reference")
        .arg(demos().join("reference.json"))
        .arg("--scenario")
        .arg(dir.path().join("missing.json"))
        .arg("--out")
        .arg(dir.path())
        .assert()
        .code(4);
}

#[test]
fn bad_pairings_are_validation_exit() {
    let dir = tempfile::tempdir().unwrap();
    let scenario = dir.path().join("scenario.json");
    fs::write(
        &scenario,
        r#"{"national_votes": {"Lab": 50.0, "Con": 50.0}, "pairings": {"Ashby Vale": "Brookmere"}}"#,
    )
    .unwrap();
    seatsim()
        .arg("--reference")
        .arg(demos().join("reference.json"))
        .arg("--scenario")
        .arg(&scenario)
        .arg("--out")
        .arg(dir.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("/pairings"));
}

#[test]
fn empty_pairings_are_validation_exit() {
    let dir = tempfile::tempdir().unwrap();
    let scenario = dir.path().join("scenario.json");
    fs::write(&scenario, r#"{"national_votes": {"Lab": 50.0, "Con": 50.0}, "pairings": []}"#).unwrap();
    seatsim()
        .arg("--reference")
        .arg(demos().join("reference.json"))
        .arg("--scenario")
        .arg(&scenario)
        .arg("--out")
        .arg(dir.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("pairing list is empty"));
    assert!(!dir.path().join("result.json").exists());
}

#[test]
fn unknown_swing_token_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = seatsim();
    demo_args(&mut cmd, dir.path());
    cmd.args(["--swing", "sideways"]).assert().code(2);
}
