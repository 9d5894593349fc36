//! CLI end-to-end tests
//!
//! Tests for the unfurl command-line interface.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

/// Get a command for the unfurl binary
#[allow(deprecated)]
fn unfurl_cmd() -> Command {
    Command::cargo_bin("unfurl").unwrap()
}

#[test]
fn no_args_shows_help() {
    let mut cmd = unfurl_cmd();
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn help_flag() {
    let mut cmd = unfurl_cmd();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("unfurl"))
        .stdout(predicate::str::contains("Usage"));
}

#[test]
fn version_flag() {
    let mut cmd = unfurl_cmd();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("unfurl"));
}

#[test]
fn version_subcommand() {
    let mut cmd = unfurl_cmd();
    cmd.arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("unfurl"))
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn serve_help() {
    let mut cmd = unfurl_cmd();
    cmd.args(["serve", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Start the HTTP server"));
}

#[test]
fn resolve_help() {
    let mut cmd = unfurl_cmd();
    cmd.args(["resolve", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Resolve a single URL"));
}

#[test]
fn resolve_requires_url() {
    let mut cmd = unfurl_cmd();
    cmd.arg("resolve")
        .assert()
        .failure()
        .stderr(predicate::str::contains("URL"));
}

#[test]
fn resolve_rejects_invalid_url() {
    let mut cmd = unfurl_cmd();
    cmd.args(["resolve", "definitely not a url"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid URL"));
}

#[test]
fn serve_rejects_out_of_range_port() {
    let mut cmd = unfurl_cmd();
    cmd.args(["serve", "--port", "99999"]).assert().failure();
}

#[test]
fn validate_without_config_uses_defaults() {
    let mut cmd = unfurl_cmd();
    cmd.arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("defaults"));
}

#[test]
fn validate_accepts_good_config() {
    let temp = tempdir().unwrap();
    let config_file = temp.path().join("config.toml");

    fs::write(
        &config_file,
        r#"
[server]
host = "127.0.0.1"
port = 3200

[resolution]
timeout_secs = 10
"#,
    )
    .unwrap();

    let mut cmd = unfurl_cmd();
    cmd.args(["validate", config_file.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("valid"))
        .stdout(predicate::str::contains("127.0.0.1:3200"));
}

#[test]
fn validate_rejects_bad_config() {
    let temp = tempdir().unwrap();
    let config_file = temp.path().join("config.toml");

    fs::write(
        &config_file,
        r#"
[server]
port = 0
"#,
    )
    .unwrap();

    let mut cmd = unfurl_cmd();
    cmd.args(["validate", config_file.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("port"));
}

#[test]
fn validate_rejects_unpaired_upstream() {
    let temp = tempdir().unwrap();
    let config_file = temp.path().join("config.toml");

    fs::write(
        &config_file,
        r#"
[upstream]
host = "https://edge.example.com"
"#,
    )
    .unwrap();

    let mut cmd = unfurl_cmd();
    cmd.args(["validate", config_file.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("token"));
}

#[test]
fn missing_config_file_fails() {
    let mut cmd = unfurl_cmd();
    cmd.args(["validate", "/nonexistent/unfurl.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read config"));
}
