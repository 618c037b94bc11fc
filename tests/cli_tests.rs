//! CLI tests for the tracereplay binary
//!
//! Runs the built binary against capture files written to a temp directory and
//! checks output and exit codes.

use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use std::str;

use serde_json::{Value, json};
use tempfile::TempDir;

/// Run the binary with the given arguments
fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tracereplay"))
        .args(args)
        .env_remove("TRACEREPLAY_LOG_LEVEL")
        .env_remove("TRACEREPLAY_REPLAY_REQUEST_TIMEOUT_MS")
        .output()
        .expect("Failed to execute command")
}

fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("Failed to write test file");
    path
}

fn openai_capture() -> String {
    json!({"attributes": {"http.request.body.text": {
        "model": "gpt-4o-mini",
        "messages": [
            {"role": "system", "content": "Be terse."},
            {"role": "user", "content": "Hi"},
            {"role": "assistant", "content": "Hello."},
            {"role": "user", "content": "Bye"}
        ]
    }}})
    .to_string()
}

fn stdout(output: &Output) -> &str {
    str::from_utf8(&output.stdout).expect("Invalid UTF-8")
}

/// Test that --version and -V print the version
#[test]
fn test_version_flags() {
    for flag in ["--version", "-V"] {
        let output = run(&[flag]);
        assert!(output.status.success(), "Version command should succeed");
        assert_eq!(stdout(&output).trim(), format!("tracereplay {}", env!("CARGO_PKG_VERSION")));
    }
}

/// Test that --help, -h and no arguments show usage information
#[test]
fn test_help_flags() {
    for args in [&["--help"][..], &["-h"][..], &[][..]] {
        let output = run(args);
        assert!(output.status.success(), "Help command should succeed");
        let out = stdout(&output);
        assert!(out.contains("USAGE"), "Help output should contain 'USAGE', got: {}", out);
        assert!(out.contains("COMMANDS"), "Help output should contain 'COMMANDS', got: {}", out);
        assert!(out.contains("ENVIRONMENT VARIABLES"));
    }
}

/// Test that detect prints the format of a valid capture
#[test]
fn test_detect_openai_capture() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "capture.json", &openai_capture());

    let output = run(&["detect", path.to_str().unwrap()]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "http_body_openai");
}

/// Test that detect exits with 1 for an unrecognized capture
#[test]
fn test_detect_unknown_capture() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "capture.json", r#"{"attributes": {"other": 1}}"#);

    let output = run(&["detect", path.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stdout(&output).trim(), "unknown");
}

/// Test that parse prints the stored split as JSON
#[test]
fn test_parse_capture() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "capture.json", &openai_capture());

    let output = run(&["parse", path.to_str().unwrap()]);
    assert!(output.status.success());

    let parsed: Value = serde_json::from_str(stdout(&output)).expect("parse output should be JSON");
    assert_eq!(parsed["system_prompt"], json!("Be terse."));
    assert_eq!(parsed["last_user_message"], json!("Bye"));
    assert_eq!(parsed["model_name"], json!("gpt-4o-mini"));
    assert_eq!(parsed["middle_messages"].as_array().map(Vec::len), Some(2));
}

/// Test that preview prints the rebuilt message list
#[test]
fn test_preview_capture() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "capture.json", &openai_capture());

    let output = run(&["preview", path.to_str().unwrap()]);
    assert!(output.status.success());

    let preview: Value = serde_json::from_str(stdout(&output)).expect("preview output should be JSON");
    assert_eq!(preview["messages"].as_array().map(Vec::len), Some(4));
    assert_eq!(preview["preview"]["other_messages_count"], json!(2));
    assert_eq!(preview["preview"]["has_tools"], json!(false));
}

/// Test that parse fails on a capture without a model
#[test]
fn test_parse_invalid_capture() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "capture.json",
        r#"{"attributes": {"http.request.body.text": {"model": "", "messages": []}}}"#,
    );

    let output = run(&["parse", path.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = str::from_utf8(&output.stderr).unwrap();
    assert!(stderr.contains("Invalid capture data"), "got: {}", stderr);
}

/// Test that a missing capture file is reported
#[test]
fn test_missing_capture_file() {
    let output = run(&["parse", "/nonexistent/capture.json"]);
    assert_eq!(output.status.code(), Some(1));
}

/// Test that unknown commands and options exit with 1
#[test]
fn test_unknown_command() {
    let output = run(&["replay-everything"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(str::from_utf8(&output.stderr).unwrap().contains("Unknown command"));

    let output = run(&["--bogus"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(str::from_utf8(&output.stderr).unwrap().contains("Unknown option"));
}

/// Test that validate reports configuration errors from an explicit file
#[test]
fn test_validate_with_config_file() {
    let dir = TempDir::new().unwrap();

    let good = write_file(&dir, "good.toml", "[replay]\nrequest_timeout_ms = 30000\n");
    let output = run(&["--config", good.to_str().unwrap(), "validate"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("[OK] Configuration is valid"));

    let bad = write_file(&dir, "bad.toml", "[replay]\nrequest_timeout_ms = 0\n");
    let output = run(&["-c", bad.to_str().unwrap(), "validate"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(str::from_utf8(&output.stderr).unwrap().contains("Request timeout cannot be zero"));
}
