//! Loader round trips against files on disk.

use std::fs;
use std::path::{Path, PathBuf};

use assert_json_diff::assert_json_eq;
use serde_json::json;
use sim_io::{canonical_json, load_inputs, IoError};

fn write(dir: &Path, name: &str, body: &serde_json::Value) -> PathBuf {
    let p = dir.join(name);
    fs::write(&p, serde_json::to_vec_pretty(body).unwrap()).unwrap();
    p
}

fn reference() -> serde_json::Value {
    json!({
        "parties": [
            {"id": "A", "ideology": 3.0, "class": "major", "bloc": "left"},
            {"id": "B", "ideology": 7.0, "class": "major", "bloc": "right"},
            {"id": "C", "ideology": 5.0, "class": "minor", "bloc": "centre"}
        ],
        "national_baseline": {"A": 50.0, "B": 30.0, "C": 20.0},
        "units": [
            {"name": "North Ward", "electors": 1000, "baseline": {"A": 50.0, "B": 30.0, "C": 20.0}},
            {"name": "South Ward", "electors": 1000, "baseline": {"A": 50.0, "B": 30.0, "C": 20.0}}
        ]
    })
}

#[test]
fn loads_inputs_and_digests_ignore_formatting() {
    let dir = tempfile::tempdir().unwrap();
    let r = write(dir.path(), "reference.json", &reference());
    let s = write(
        dir.path(),
        "scenario.json",
        &json!({
            "national_votes": {"A": 50.0, "B": 30.0, "C": 20.0},
            "pairings": [["North Ward", "South Ward"]],
            "options": {"swing_type": "proportional-bounded", "seats_per_district": 4}
        }),
    );
    let first = load_inputs(&r, &s).unwrap();
    assert_eq!(first.scenario.pairings.len(), 1);
    assert_eq!(first.scenario.options.seats_per_district, 4);
    assert_eq!(first.scenario.options.closest_contests_limit, 10);

    // Same content, compact and with keys in another order.
    let compact = dir.path().join("reference-compact.json");
    fs::write(&compact, canonical_json::to_canonical_json_bytes(&reference())).unwrap();
    let second = load_inputs(&compact, &s).unwrap();
    assert_eq!(first.digests, second.digests);
    assert_eq!(first.reference, second.reference);
}

#[test]
fn scenario_echo_is_stable_json() {
    let dir = tempfile::tempdir().unwrap();
    let r = write(dir.path(), "reference.json", &reference());
    let s = write(
        dir.path(),
        "scenario.json",
        &json!({"national_votes": {"A": 40.0, "B": 60.0}, "pairings": [["North Ward", "South Ward"]]}),
    );
    let loaded = load_inputs(&r, &s).unwrap();
    let echoed = serde_json::to_value(&loaded.scenario).unwrap();
    assert_json_eq!(
        echoed,
        json!({
            "national_votes": {"A": 40.0, "B": 60.0},
            "pairings": [["North Ward", "South Ward"]],
            "options": {
                "swing_type": "uniform",
                "regional_swings": {},
                "seats_per_district": 6,
                "closest_contests_limit": 10,
                "coalition": {
                    "method": "ideology_history",
                    "ideology_weight": 0.6,
                    "history_weight": 0.4,
                    "disconnect_below": -5.0,
                    "max_parties": 3,
                    "top_n": 5,
                    "minimum_excess": 3,
                    "minimal_excess": 5
                }
            }
        })
    );
}

#[test]
fn wrongly_shaped_pairings_are_schema_errors() {
    let dir = tempfile::tempdir().unwrap();
    let r = write(dir.path(), "reference.json", &reference());
    let s = write(
        dir.path(),
        "scenario.json",
        &json!({"national_votes": {"A": 100.0}, "pairings": {"North Ward": "South Ward"}}),
    );
    assert!(matches!(load_inputs(&r, &s), Err(IoError::Schema { .. })));
}

#[test]
fn missing_file_is_a_path_error() {
    let dir = tempfile::tempdir().unwrap();
    let r = write(dir.path(), "reference.json", &reference());
    let err = load_inputs(&r, &dir.path().join("nope.json")).unwrap_err();
    assert!(matches!(err, IoError::Path(_)));
}
