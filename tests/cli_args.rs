//! Integration tests for CLI argument handling
//!
//! Only exercises paths that fail or exit before any network access.

use std::process::Command;

/// Helper to run the CLI with given args and capture output
fn run_cli(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_ibgefetch"))
        .args(args)
        .output()
        .expect("Failed to execute ibgefetch")
}

#[test]
fn test_help_flag_exits_successfully() {
    let output = run_cli(&["--help"]);
    assert!(output.status.success(), "Expected --help to exit successfully");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ibgefetch"), "Help should mention ibgefetch");
    assert!(stdout.contains("--ttl"), "Help should mention --ttl flag");
    assert!(stdout.contains("--retry"), "Help should mention --retry flag");
}

#[test]
fn test_missing_target_fails() {
    let output = run_cli(&[]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("TARGET"), "Should name the missing argument: {}", stderr);
}

#[test]
fn test_invalid_ttl_class_is_rejected() {
    let output = run_cli(&["--ttl", "forever", "v1/localidades/estados"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("static") && stderr.contains("realtime"),
        "Should list the valid TTL classes: {}",
        stderr
    );
}

#[test]
fn test_invalid_retry_profile_is_rejected() {
    let output = run_cli(&["--retry", "sometimes", "v1/localidades/estados"]);
    assert!(!output.status.success());
}

#[test]
fn test_zero_timeout_prints_error_and_exits() {
    let output = run_cli(&["--timeout", "0", "v1/localidades/estados"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid timeout"), "Unexpected stderr: {}", stderr);
}

#[test]
fn test_blank_target_prints_error_and_exits() {
    let output = run_cli(&[" "]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid target"), "Unexpected stderr: {}", stderr);
}
