//! Integration tests for checking ParchMint files on disk and reporting
//! the results.

use std::fs;
use std::path::Path;

use parchmint_check::config::load_config;
use parchmint_check::parchmint::{check_file, ParchmintError};
use parchmint_check::report::{render, render_all, OutputFormat};
use tempfile::TempDir;

const VALID: &str = r#"{
    "name": "single port",
    "layers": [ { "id": "flow", "name": "flow" } ],
    "components": [ {
        "id": "p1", "name": "inlet", "layers": ["flow"], "entity": "PORT",
        "x-span": 10, "y-span": 10,
        "ports": [ { "label": "1", "layer": "flow", "x": 10, "y": 5 } ]
    } ]
}"#;

const INVALID: &str = r#"{
    "layers": [ { "id": "flow", "name": "flow" } ],
    "components": [ {
        "id": "p1", "name": "inlet", "layers": ["flow"], "entity": "PORT",
        "x-span": 10, "y-span": 10,
        "ports": [ { "label": "1", "layer": "flow", "x": 3, "y": 6 } ]
    } ]
}"#;

fn write(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

// =============================================================================
// check_file
// =============================================================================

#[test]
fn test_check_valid_file() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "valid.json", VALID);

    let checked = check_file(&path).unwrap();
    assert!(checked.valid);
    assert_eq!(checked.device.name.as_deref(), Some("single port"));
}

#[test]
fn test_check_invalid_file() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "invalid.json", INVALID);

    let checked = check_file(&path).unwrap();
    assert!(!checked.valid);
    assert_eq!(checked.error_count(), 1);
}

#[test]
fn test_check_file_with_bad_json() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "broken.json", "{ \"layers\": [");

    assert!(matches!(
        check_file(&path),
        Err(ParchmintError::InvalidJson { .. })
    ));
}

#[test]
fn test_check_missing_file() {
    let dir = TempDir::new().unwrap();
    let err = check_file(&dir.path().join("absent.json")).unwrap_err();
    assert!(err.to_string().contains("absent.json"));
}

// =============================================================================
// Reports
// =============================================================================

#[test]
fn test_text_report_for_invalid_file() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "invalid.json", INVALID);
    let checked = check_file(&path).unwrap();

    let out = render(&checked, Path::new("invalid.json"), OutputFormat::Text).unwrap();
    assert!(out.starts_with("invalid.json: INVALID (1 error, 0 warnings)"));
    assert!(out.contains("error[port-out-of-bounds]"));
}

#[test]
fn test_json_report_for_several_files() {
    let dir = TempDir::new().unwrap();
    let valid = check_file(&write(&dir, "a.json", VALID)).unwrap();
    let invalid = check_file(&write(&dir, "b.json", INVALID)).unwrap();

    let out = render_all(
        &[(Path::new("a.json"), &valid), (Path::new("b.json"), &invalid)],
        OutputFormat::Json,
    )
    .unwrap();
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();

    assert_eq!(value.as_array().unwrap().len(), 2);
    assert_eq!(value[0]["valid"], true);
    assert_eq!(value[1]["valid"], false);
    assert_eq!(value[1]["errors"], 1);
}

#[test]
fn test_csv_report_without_diagnostics_is_empty() {
    let dir = TempDir::new().unwrap();
    let checked = check_file(&write(&dir, "a.json", VALID)).unwrap();

    let out = render(&checked, Path::new("a.json"), OutputFormat::Csv).unwrap();
    assert!(out.is_empty());
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn test_config_selects_report_format() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "config.json",
        r#"{ "output": { "format": "csv" }, "validation": { "warnings_as_errors": true } }"#,
    );

    let config = load_config(Some(&path)).unwrap();
    assert_eq!(config.output.format().unwrap(), OutputFormat::Csv);
    assert!(config.validation.warnings_as_errors);
}
