//! Integration tests for the `fabzone` CLI binary.
//!
//! Argument parsing, help output, shell completions and error handling run
//! without a switch; the apply tests drive a mocked FOS REST API.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const EFFECTIVE: &str = "/rest/running/brocade-zone/effective-configuration";
const DEFINED: &str = "/rest/running/brocade-zone/defined-configuration";

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `fabzone` binary with env isolation.
///
/// Clears all `FABZONE_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn fabzone_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("fabzone");
    cmd.env("HOME", "/tmp/fabzone-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/fabzone-cli-test-nonexistent")
        .env_remove("FABZONE_PROFILE")
        .env_remove("FABZONE_ADDRESS")
        .env_remove("FABZONE_USER")
        .env_remove("FABZONE_SECURITY")
        .env_remove("FABZONE_FID")
        .env_remove("FABZONE_OUTPUT")
        .env_remove("FABZONE_TIMEOUT")
        .env_remove("FABZONE_PASSWORD");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// A switch with one alias, one zone and an effective configuration.
async fn mock_switch() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/login"))
        .respond_with(ResponseTemplate::new(200).insert_header("Authorization", "Custom_Basic abc"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/logout"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(DEFINED))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Response": {
                "defined-configuration": {
                    "cfg": { "cfg-name": "prod", "member-zone": { "zone-name": ["z1"] } },
                    "zone": [{ "zone-name": "z1", "zone-type": 0, "member-entry": { "entry-name": ["host_a", "1,2"] } }],
                    "alias": [{ "alias-name": "host_a", "member-entry": { "alias-entry-name": ["10:00:00:00:00:00:00:01"] } }]
                }
            }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(EFFECTIVE))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Response": {
                "effective-configuration": {
                    "cfg-name": "prod",
                    "checksum": "c0ffee",
                    "default-zone-access": 0,
                    "enabled-zone": [{ "zone-name": "z1", "member-entry": { "entry-name": ["10:00:00:00:00:00:00:01", "1,2"] } }]
                }
            }
        })))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path(EFFECTIVE))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    server
}

/// Run the binary off the async runtime so the mock server keeps serving.
async fn run_against(server: &MockServer, args: Vec<String>) -> std::process::Output {
    let address = server.address().to_string();
    tokio::task::spawn_blocking(move || {
        fabzone_cmd()
            .env("FABZONE_PASSWORD", "password")
            .args(["--address", &address, "--user", "admin", "--security", "none"])
            .args(args)
            .output()
            .unwrap()
    })
    .await
    .unwrap()
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = fabzone_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    fabzone_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("zoning")
            .and(predicate::str::contains("apply"))
            .and(predicate::str::contains("show"))
            .and(predicate::str::contains("config")),
    );
}

#[test]
fn test_version_flag() {
    fabzone_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("fabzone"));
}

#[test]
fn test_apply_help_lists_modes() {
    fabzone_cmd().args(["apply", "--help"]).assert().success().stdout(
        predicate::str::contains("--test")
            .and(predicate::str::contains("--bulk"))
            .and(predicate::str::contains("--no-force")),
    );
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    fabzone_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    fabzone_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let output = fabzone_cmd().arg("foobar").output().unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_show_without_switch_configured() {
    fabzone_cmd()
        .args(["show", "zones"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config init").or(predicate::str::contains("profile")));
}

#[test]
fn test_unknown_profile() {
    let output = fabzone_cmd()
        .args(["--profile", "nope", "show", "zones"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4));
    assert!(combined_output(&output).contains("nope"));
}

#[test]
fn test_invalid_security_value() {
    fabzone_cmd()
        .args(["--security", "tls", "show", "zones"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("tls"));
}

#[test]
fn test_config_show_no_config() {
    // `config show` renders the default config when no file exists.
    fabzone_cmd().args(["config", "show"]).assert().success();
}

#[test]
fn test_apply_missing_file() {
    fabzone_cmd()
        .args(["apply", "/tmp/fabzone-cli-test-nonexistent/batch.json"])
        .assert()
        .failure();
}

#[test]
fn test_apply_malformed_batch() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("batch.json");
    std::fs::write(&file, "[not a batch").unwrap();
    let output = fabzone_cmd()
        .arg("apply")
        .arg(&file)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

// ── Against a mocked switch ─────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_apply_test_mode_reports_json() {
    let server = mock_switch().await;
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("batch.json");
    std::fs::write(
        &file,
        json!({
            "changes": [
                { "c-type": "alias-create", "operand": "srv1", "p0": "10:00:00:00:00:00:00:09" },
                { "c-type": "zone-add", "operand": "z1", "p0": "srv1" }
            ]
        })
        .to_string(),
    )
    .unwrap();

    let output = run_against(
        &server,
        vec![
            "--fid".into(),
            "128".into(),
            "-o".into(),
            "json".into(),
            "apply".into(),
            file.display().to_string(),
            "--test".into(),
        ],
    )
    .await;

    let text = combined_output(&output);
    assert!(output.status.success(), "apply failed:\n{text}");
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["fid"], 128);
    assert_eq!(report["results"].as_array().unwrap().len(), 2);
    assert_eq!(report["results"][1]["remoteCallMade"], false);
    assert_eq!(report["summary"]["changed"], 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_apply_failure_exits_with_batch_code() {
    let server = mock_switch().await;
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("batch.yaml");
    std::fs::write(
        &file,
        "changes:\n  - c-type: alias-add\n    operand: ghost\n    p0: 1,9\n",
    )
    .unwrap();

    let output = run_against(
        &server,
        vec![
            "--fid".into(),
            "128".into(),
            "apply".into(),
            file.display().to_string(),
            "--test".into(),
            "--no-force".into(),
        ],
    )
    .await;

    assert_eq!(output.status.code(), Some(9), "{}", combined_output(&output));
    assert!(String::from_utf8_lossy(&output.stdout).contains("404"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_show_zones_plain() {
    let server = mock_switch().await;
    let output = run_against(
        &server,
        vec!["--fid".into(), "128".into(), "-o".into(), "plain".into(), "show".into(), "zones".into()],
    )
    .await;

    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "z1");
}
