//! Integration tests for configuration handling in the binary.
//!
//! These run `--check-config` and `--show-config`, which never touch the
//! database.

use std::io::Write;
use tempfile::NamedTempFile;

/// Helper to get the binary path
fn binary_path() -> std::path::PathBuf {
    std::path::PathBuf::from(env!("CARGO_BIN_EXE_mysql-watcher"))
}

fn config_file(suffix: &str, content: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write config");
    file
}

fn run(args: &[&str]) -> (bool, String, String) {
    let output = std::process::Command::new(binary_path())
        .args(args)
        .output()
        .expect("Failed to execute command");
    (
        output.status.success(),
        String::from_utf8_lossy(&output.stdout).into_owned(),
        String::from_utf8_lossy(&output.stderr).into_owned(),
    )
}

#[test]
fn test_defaults_are_valid() {
    let (ok, stdout, _) = run(&["--no-config", "--check-config"]);
    assert!(ok);
    assert!(stdout.contains("✅ Configuration is valid"));
}

#[test]
fn test_zero_interval_is_rejected() {
    let (ok, _, stderr) = run(&["--no-config", "--interval", "0", "--check-config"]);
    assert!(!ok);
    assert!(
        stderr.contains("interval must be greater than 0"),
        "unexpected stderr: '{}'",
        stderr
    );
}

#[test]
fn test_valid_yaml_file() {
    let file = config_file(
        ".yaml",
        r#"
interval: 5
output_format: html
database:
  host: db01
  db: shop
sections:
  metrics: OFF
  slow_query_topN: 20
custom_sections:
  - title: Accounts
    query: SELECT user, host FROM mysql.user
    styles: ["user,l", "host,l"]
"#,
    );
    let path = file.path().to_str().unwrap();
    let (ok, stdout, stderr) = run(&["-c", path, "--check-config"]);
    assert!(ok, "stderr: '{}'", stderr);
    assert!(stdout.contains("✅ Configuration is valid"));
}

#[test]
fn test_unknown_section_is_rejected() {
    let file = config_file(".yaml", "sections:\n  no_such_section: ON\n");
    let path = file.path().to_str().unwrap();
    let (ok, _, stderr) = run(&["-c", path, "--check-config"]);
    assert!(!ok);
    assert!(stderr.contains("Unknown section 'no_such_section'"));
}

#[test]
fn test_bad_custom_style_is_rejected() {
    let file = config_file(
        ".json",
        r#"{"custom_sections": [{"title": "T", "query": "SELECT 1", "styles": ["x,q"]}]}"#,
    );
    let path = file.path().to_str().unwrap();
    let (ok, _, stderr) = run(&["-c", path, "--check-config"]);
    assert!(!ok);
    assert!(stderr.contains("custom section 'T' has invalid styles"));
}

#[test]
fn test_missing_explicit_config_fails() {
    let (ok, _, stderr) = run(&["-c", "/nonexistent/mysql-watcher.yaml", "--check-config"]);
    assert!(!ok);
    assert!(stderr.contains("Config file not found"));
}

#[test]
fn test_show_config_applies_cli_overrides() {
    let (ok, stdout, _) = run(&[
        "--no-config",
        "--host",
        "db02",
        "--port",
        "3307",
        "-s",
        "html",
        "--show-config",
        "--config-format",
        "json",
    ]);
    assert!(ok);
    let value: serde_json::Value = serde_json::from_str(&stdout).expect("show-config emits JSON");
    assert_eq!(value["database"]["host"], "db02");
    assert_eq!(value["database"]["port"], 3307);
    assert_eq!(value["output_format"], "html");
}
