//! Integration tests for the `surveil` CLI binary.
//!
//! These tests use `assert_cmd` and `predicates` to run each subcommand through
//! the actual binary, covering stdin/stdout piping, file I/O, configuration
//! overrides and per-row error reporting.

// `Command::cargo_bin` was deprecated in assert_cmd 2.1.2 in favor of
// `cargo::cargo_bin_cmd!`. Allow it until we migrate.
#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;

fn fixture(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

fn surveil() -> Command {
    Command::cargo_bin("surveil").unwrap()
}

/// Run the binary and parse stdout as JSON.
fn run_json(args: &[&str]) -> Value {
    let output = surveil().args(args).output().unwrap();
    assert!(output.status.success(), "surveil {:?} failed", args);
    serde_json::from_slice(&output.stdout).expect("stdout must be JSON")
}

// ─────────────────────────────────────────────────────────────────────────────
// coverage
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn coverage_reports_each_exam() {
    let json = run_json(&["coverage", "-i", &fixture("exams.json")]);
    let results = json.as_array().unwrap();

    assert_eq!(results.len(), 4);
    assert_eq!(results[0]["optimal"]["start"], "08:15");
    assert_eq!(results[0]["optimal"]["end"], "11:00");
    assert_eq!(results[2]["optimal"]["end"], "12:00");
    assert_eq!(results[3]["is_covered"], false);
    assert_eq!(results[3]["matched_windows"], Value::Array(vec![]));
}

#[test]
fn coverage_uncovered_only() {
    let json = run_json(&["coverage", "--uncovered-only", "-i", &fixture("exams.json")]);
    let results = json.as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["exam"]["id"], "4");
}

#[test]
fn coverage_reads_stdin() {
    let input = std::fs::read_to_string(fixture("exams.json")).unwrap();
    surveil()
        .arg("coverage")
        .write_stdin(input)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"is_covered\": true"));
}

#[test]
fn config_file_changes_the_catalogue() {
    let json = run_json(&[
        "--config",
        &fixture("windows.toml"),
        "coverage",
        "-i",
        &fixture("exams.json"),
    ]);
    let results = json.as_array().unwrap();
    assert_eq!(results[0]["optimal"]["label"], "Morning");
    assert_eq!(results[3]["optimal"]["label"], "Midday");
}

#[test]
fn buffer_flag_overrides_the_default() {
    // With no buffer, 12:00-12:30 still needs a window starting by 12:00.
    let json = run_json(&["--buffer", "0", "coverage", "-i", &fixture("exams.json")]);
    assert_eq!(json[0]["optimal"]["end"], "11:00");
    assert_eq!(json[3]["is_covered"], false);

    // With 15 minutes, 11:15-12:00 arrives at 11:00: only the long morning window fits.
    let json = run_json(&["--buffer", "15", "coverage", "-i", &fixture("exams.json")]);
    assert_eq!(json[2]["optimal"]["end"], "12:00");
}

#[test]
fn missing_config_file_fails() {
    surveil()
        .args(["--config", "/nonexistent/windows.toml", "coverage", "-i", &fixture("exams.json")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load configuration"));
}

// ─────────────────────────────────────────────────────────────────────────────
// consolidate
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn consolidate_merges_rooms() {
    let json = run_json(&["consolidate", "-i", &fixture("exams.json")]);
    let groups = json.as_array().unwrap();

    assert_eq!(groups.len(), 3);
    assert_eq!(groups[0]["course_code"], "LMAT1101");
    assert_eq!(groups[0]["room_count"], 2);
    assert_eq!(groups[0]["total_supervisors"], 5);
    assert_eq!(groups[0]["can_be_validated"], true);
    assert_eq!(groups[1]["can_be_validated"], false);
}

#[test]
fn consolidate_writes_output_file() {
    let output_path = std::env::temp_dir().join("surveil-test-groups.json");
    let _ = std::fs::remove_file(&output_path);

    surveil()
        .args([
            "consolidate",
            "-i",
            &fixture("exams.json"),
            "-o",
            output_path.to_str().unwrap(),
        ])
        .assert()
        .success();

    let content = std::fs::read_to_string(&output_path).expect("output file must exist");
    let groups: Value = serde_json::from_str(&content).unwrap();
    assert_eq!(groups.as_array().unwrap().len(), 3);

    let _ = std::fs::remove_file(&output_path);
}

// ─────────────────────────────────────────────────────────────────────────────
// calendar / day
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn calendar_groups_by_week_and_lists_uncovered() {
    let json = run_json(&["calendar", "--grouped", "-i", &fixture("exams.json")]);

    let weeks = json["weeks"].as_array().unwrap();
    assert_eq!(weeks.len(), 1);
    assert_eq!(weeks[0]["week"]["week"], 3);
    assert_eq!(weeks[0]["starts_on"], "2026-01-12");

    let windows = weeks[0]["days"][0]["windows"].as_array().unwrap();
    assert_eq!(windows.len(), 2);
    assert_eq!(windows[0]["items"][0]["room_count"], 2);

    assert_eq!(json["uncovered"][0]["course_code"], "LCHM1111");
}

#[test]
fn day_view_for_a_single_date() {
    let json = run_json(&["day", "--date", "2026-01-12", "-i", &fixture("exams.json")]);
    assert_eq!(json["date"], "2026-01-12");
    let windows = json["windows"].as_array().unwrap();
    assert_eq!(windows.len(), 2);
    assert_eq!(windows[0]["items"].as_array().unwrap().len(), 2);
}

#[test]
fn day_rejects_bad_date() {
    surveil()
        .args(["day", "--date", "12/01/2026", "-i", &fixture("exams.json")])
        .assert()
        .failure();
}

// ─────────────────────────────────────────────────────────────────────────────
// summary and input errors
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn summary_prints_counters() {
    surveil()
        .args(["summary", "-i", &fixture("exams.json")])
        .assert()
        .success()
        .stdout(predicate::str::contains("Exams:        4"))
        .stdout(predicate::str::contains("Uncovered:    1"))
        .stdout(predicate::str::contains("  - 4"))
        .stdout(predicate::str::contains("Groups:       3"))
        .stdout(predicate::str::contains("Supervisors:  8"));
}

#[test]
fn malformed_rows_are_skipped_with_a_warning() {
    let output = surveil()
        .args(["coverage", "-i", &fixture("malformed.json")])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("skipping malformed exam row"), "stderr: {}", stderr);
    assert!(stderr.contains("index=1"), "stderr: {}", stderr);
    assert!(stderr.contains("exam_id=inverted"), "stderr: {}", stderr);
    assert_eq!(
        stderr.matches("exam inverted").count(),
        1,
        "each rejected row is reported once: {}",
        stderr
    );

    let results: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(results.as_array().unwrap().len(), 1);
    assert_eq!(results[0]["exam"]["id"], "good");
}

#[test]
fn rejected_rows_are_silent_below_warn_level() {
    let output = surveil()
        .args(["--log-level", "error", "coverage", "-i", &fixture("malformed.json")])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(!String::from_utf8_lossy(&output.stderr).contains("skipping"));
}

#[test]
fn non_array_input_fails() {
    surveil()
        .arg("consolidate")
        .write_stdin(r#"{"id":"1"}"#)
        .assert()
        .failure()
        .stderr(predicate::str::contains("JSON array"));
}

#[test]
fn missing_input_file_fails() {
    surveil()
        .args(["coverage", "-i", "/nonexistent/exams.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read file"));
}
