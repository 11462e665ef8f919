//! Integration tests for the insulin binary.
//!
//! These tests verify end-to-end behavior including:
//! - Worksheet text and JSON output
//! - Report and CSV export
//! - Standalone bolus correction
//! - Input validation and config handling

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Helper to create a test directory
fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Helper to get the CLI with a config path that does not exist,
/// so the user's own config never leaks into a test
fn cli(temp_dir: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("insulin"));
    cmd.arg("--config").arg(temp_dir.path().join("absent.toml"));
    cmd
}

fn worksheet_args(cmd: &mut Command) -> &mut Command {
    cmd.arg("worksheet")
        .arg("--weight")
        .arg("70")
        .arg("--factor")
        .arg("0.3")
        .arg("--risk")
        .arg("usual")
        .arg("--visit")
        .arg("initial")
        .arg("--regimen")
        .arg("premix-tid")
}

#[test]
fn test_cli_help() {
    let temp_dir = setup_test_dir();
    cli(&temp_dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("SMART insulin dosing worksheet"));
}

#[test]
fn test_worksheet_text_output() {
    let temp_dir = setup_test_dir();
    worksheet_args(&mut cli(&temp_dir))
        .arg("--name")
        .arg("MRN-7")
        .assert()
        .success()
        .stdout(predicate::str::contains("TDD:   21.0 U"))
        .stdout(predicate::str::contains("REGIMEN: Premix three times daily"))
        .stdout(predicate::str::contains("CORRECTION TABLE"))
        .stdout(predicate::str::contains("MRN-7"))
        .stdout(predicate::str::contains("Signature:"));
}

#[test]
fn test_worksheet_json_output() {
    let temp_dir = setup_test_dir();
    let output = worksheet_args(&mut cli(&temp_dir))
        .arg("--json")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let sheet: serde_json::Value = serde_json::from_slice(&output).expect("valid JSON");
    assert_eq!(sheet["dose"]["tdd"], 21.0);
    assert_eq!(sheet["dose"]["target_glucose"], 130);
    assert_eq!(sheet["patient"]["regimen"], "premix_tid");
    assert_eq!(sheet["correction_table"]["rows"].as_array().unwrap().len(), 6);
}

#[test]
fn test_escalation_visit_uses_step() {
    let temp_dir = setup_test_dir();
    let output = cli(&temp_dir)
        .arg("worksheet")
        .arg("--weight")
        .arg("70")
        .arg("--factor")
        .arg("0.3")
        .arg("--risk")
        .arg("usual")
        .arg("--visit")
        .arg("inadequate-control")
        .arg("--previous-tdd")
        .arg("40")
        .arg("--step")
        .arg("20")
        .arg("--regimen")
        .arg("basal-bolus")
        .arg("--json")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let sheet: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(sheet["dose"]["tdd"], 48.0);
    assert!(sheet["dose"]["adjustment_note"]
        .as_str()
        .unwrap()
        .contains("increased by 20%"));
}

#[test]
fn test_worksheet_exports_report_and_csv() {
    let temp_dir = setup_test_dir();
    let report_path = temp_dir.path().join("out/sheet.txt");
    let csv_path = temp_dir.path().join("out/correction.csv");

    worksheet_args(&mut cli(&temp_dir))
        .arg("--output")
        .arg(&report_path)
        .arg("--csv")
        .arg(&csv_path)
        .assert()
        .success()
        .stderr(predicate::str::contains("Worksheet saved"))
        .stderr(predicate::str::contains("Exported 6 correction rows"));

    let report = fs::read_to_string(&report_path).expect("report written");
    assert!(report.contains("DISCLAIMER"));

    let csv = fs::read_to_string(&csv_path).expect("csv written");
    assert!(csv.starts_with("glucose_range,low,high,units_usual,units_hypo,correction_factor"));
    assert_eq!(csv.lines().count(), 7);
}

#[test]
fn test_invalid_weight_rejected() {
    let temp_dir = setup_test_dir();
    cli(&temp_dir)
        .arg("worksheet")
        .arg("--weight")
        .arg("10")
        .arg("--factor")
        .arg("0.3")
        .arg("--risk")
        .arg("usual")
        .arg("--visit")
        .arg("initial")
        .arg("--regimen")
        .arg("basal")
        .assert()
        .failure()
        .stderr(predicate::str::contains("weight must be between"));
}

#[test]
fn test_missing_previous_tdd_rejected() {
    let temp_dir = setup_test_dir();
    cli(&temp_dir)
        .arg("worksheet")
        .arg("--weight")
        .arg("70")
        .arg("--factor")
        .arg("0.3")
        .arg("--risk")
        .arg("hypo-concern")
        .arg("--visit")
        .arg("hypoglycemia")
        .arg("--regimen")
        .arg("basal")
        .assert()
        .failure()
        .stderr(predicate::str::contains("previous TDD is required"));
}

#[test]
fn test_unknown_regimen_rejected() {
    let temp_dir = setup_test_dir();
    cli(&temp_dir)
        .arg("worksheet")
        .arg("--weight")
        .arg("70")
        .arg("--factor")
        .arg("0.3")
        .arg("--risk")
        .arg("usual")
        .arg("--visit")
        .arg("initial")
        .arg("--regimen")
        .arg("nightly")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown regimen"));
}

#[test]
fn test_risk_and_visit_are_required() {
    let temp_dir = setup_test_dir();
    cli(&temp_dir)
        .arg("worksheet")
        .arg("--weight")
        .arg("70")
        .arg("--factor")
        .arg("0.3")
        .arg("--visit")
        .arg("initial")
        .arg("--regimen")
        .arg("basal")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--risk"));

    cli(&temp_dir)
        .arg("worksheet")
        .arg("--weight")
        .arg("70")
        .arg("--factor")
        .arg("0.3")
        .arg("--risk")
        .arg("usual")
        .arg("--regimen")
        .arg("basal")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--visit"));
}

#[test]
fn test_infinite_previous_tdd_rejected() {
    let temp_dir = setup_test_dir();
    cli(&temp_dir)
        .arg("worksheet")
        .arg("--weight")
        .arg("70")
        .arg("--factor")
        .arg("0.3")
        .arg("--risk")
        .arg("usual")
        .arg("--visit")
        .arg("repeat")
        .arg("--previous-tdd")
        .arg("inf")
        .arg("--regimen")
        .arg("basal")
        .assert()
        .failure()
        .stderr(predicate::str::contains("previous TDD must be at most 300 U"));
}

#[test]
fn test_bolus_text_output() {
    let temp_dir = setup_test_dir();
    cli(&temp_dir)
        .arg("bolus")
        .arg("--tdd")
        .arg("50")
        .arg("--insulin")
        .arg("regular")
        .arg("--glucose")
        .arg("180")
        .assert()
        .success()
        .stdout(predicate::str::contains("30.0 mg/dL per unit"))
        .stdout(predicate::str::contains("REFERENCE TABLE"));
}

#[test]
fn test_bolus_json_output() {
    let temp_dir = setup_test_dir();
    let output = cli(&temp_dir)
        .arg("bolus")
        .arg("--tdd")
        .arg("50")
        .arg("--insulin")
        .arg("regular")
        .arg("--glucose")
        .arg("180")
        .arg("--json")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let report: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(report["result"]["units_usual"], 2);
    assert_eq!(report["result"]["units_hypo"], 2);
    assert_eq!(report["result"]["isf"], 30.0);
    let last = &report["reference_table"]["rows"][5];
    assert_eq!(last["units_usual"], 12);
    assert_eq!(last["units_hypo"], 11);
}

#[test]
fn test_bolus_glucose_out_of_range() {
    let temp_dir = setup_test_dir();
    cli(&temp_dir)
        .arg("bolus")
        .arg("--tdd")
        .arg("50")
        .arg("--glucose")
        .arg("700")
        .assert()
        .failure()
        .stderr(predicate::str::contains("pre-meal glucose"));
}

#[test]
fn test_config_init_then_used() {
    let temp_dir = setup_test_dir();
    let config_path: PathBuf = temp_dir.path().join("config.toml");

    Command::new(assert_cmd::cargo::cargo_bin!("insulin"))
        .arg("--config")
        .arg(&config_path)
        .arg("config")
        .arg("--init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote default config"));
    assert!(config_path.exists());

    // Point the default insulin at the 1500 rule and sign the worksheet
    let edited = fs::read_to_string(&config_path)
        .unwrap()
        .replace("insulin_type = \"rapid\"", "insulin_type = \"regular\"")
        + "\n";
    fs::write(&config_path, edited).unwrap();

    Command::new(assert_cmd::cargo::cargo_bin!("insulin"))
        .arg("--config")
        .arg(&config_path)
        .arg("bolus")
        .arg("--tdd")
        .arg("50")
        .arg("--glucose")
        .arg("180")
        .assert()
        .success()
        .stdout(predicate::str::contains("Regular (1500 rule)"));

    // Second init leaves the file alone
    Command::new(assert_cmd::cargo::cargo_bin!("insulin"))
        .arg("--config")
        .arg(&config_path)
        .arg("config")
        .arg("--init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn test_config_path_flag() {
    let temp_dir = setup_test_dir();
    cli(&temp_dir)
        .arg("config")
        .arg("--path")
        .assert()
        .success()
        .stdout(predicate::str::contains("absent.toml"));
}
