//! Integration tests for the `parkpro` CLI binary.
//!
//! Argument parsing, help output and completions run without a store;
//! the rest run the binary against a wiremock transaction store.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `parkpro` binary with env isolation.
///
/// Clears all `PARKPRO_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn parkpro_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("parkpro");
    cmd.env("HOME", "/tmp/parkpro-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/parkpro-cli-test-nonexistent")
        .env("NO_COLOR", "1")
        .env_remove("PARKPRO_PROFILE")
        .env_remove("PARKPRO_STORE_URL")
        .env_remove("PARKPRO_OUTPUT")
        .env_remove("PARKPRO_INSECURE")
        .env_remove("PARKPRO_TIMEOUT")
        .env_remove("RUST_LOG");
    cmd
}

/// Run the binary off the async runtime so the mock server keeps serving.
async fn run(args: Vec<String>) -> std::process::Output {
    tokio::task::spawn_blocking(move || parkpro_cmd().args(&args).output().unwrap())
        .await
        .unwrap()
}

fn args(server: &MockServer, rest: &[&str]) -> Vec<String> {
    let mut v = vec!["--store-url".to_owned(), format!("{}/api", server.uri())];
    v.extend(rest.iter().map(|s| (*s).to_owned()));
    v
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

fn jane(exit: Option<&str>) -> Value {
    json!({
        "id": 1,
        "owner_name": "Jane Doe",
        "vehicle_name": "Civic",
        "vehicle_type": "car",
        "plate_number": "ABC123",
        "parking_slot": "A1",
        "entry_time": "2024-01-01T08:00",
        "exit_time": exit
    })
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = parkpro_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    parkpro_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("parking lot")
            .and(predicate::str::contains("slots"))
            .and(predicate::str::contains("register"))
            .and(predicate::str::contains("sessions"))
            .and(predicate::str::contains("history")),
    );
}

#[test]
fn test_version_flag() {
    parkpro_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("parkpro"));
}

#[test]
fn test_completions_zsh() {
    parkpro_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

#[test]
fn test_completions_bash() {
    parkpro_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

// ── Argument errors ─────────────────────────────────────────────────

#[test]
fn test_invalid_output_format() {
    let output = parkpro_cmd()
        .args(["--output", "invalid", "slots"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("possible values"), "{text}");
}

#[test]
fn test_short_help_names_the_product() {
    parkpro_cmd()
        .arg("-h")
        .assert()
        .success()
        .stdout(predicate::str::contains("Run a parking lot"));
}

#[test]
fn test_history_summary_takes_no_filters() {
    parkpro_cmd()
        .args(["history", "summary", "--search", "jane"])
        .assert()
        .code(2);
}

#[test]
fn test_invalid_sort_key() {
    parkpro_cmd()
        .args(["history", "list", "--sort", "plate"])
        .assert()
        .code(2);
}

#[test]
fn test_invalid_store_url() {
    parkpro_cmd()
        .args(["--store-url", "ftp://lot/api", "slots"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("base_url"));
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_show_no_config() {
    parkpro_cmd()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("default_profile"));
}

#[test]
fn test_config_set_then_use() {
    let dir = tempfile::tempdir().unwrap();
    let home = dir.path().to_str().unwrap();

    parkpro_cmd()
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home)
        .args(["--profile", "lot-b", "config", "set", "base_url", "http://lot-b:5000/api"])
        .assert()
        .success();

    parkpro_cmd()
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home)
        .args(["config", "use", "lot-b"])
        .assert()
        .success();

    parkpro_cmd()
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home)
        .args(["config", "profiles"])
        .assert()
        .success()
        .stdout(predicate::str::contains("lot-b *"));
}

#[test]
fn test_config_use_unknown_profile() {
    parkpro_cmd()
        .args(["config", "use", "nowhere"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("nowhere"));
}

// ── Against a store ─────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_slots_table_marks_taken() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/parking/occupied"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["A1", "C3"])))
        .mount(&server)
        .await;

    let output = run(args(&server, &["-o", "plain", "slots"])).await;
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("A1 taken"), "{stdout}");
    assert!(stdout.contains("A2 available"), "{stdout}");
    assert_eq!(stdout.lines().count(), 25);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_sessions_list_json_includes_charge() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/transactions"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([jane(Some("2024-01-01T10:30"))])),
        )
        .mount(&server)
        .await;

    let output = run(args(&server, &["-o", "json", "sessions", "list"])).await;
    assert!(output.status.success(), "{}", combined_output(&output));

    let rows: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(rows[0]["plate_number"], "ABC123");
    assert_eq!(rows[0]["status"], "completed");
    assert_eq!(rows[0]["charge"], 60);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_register_reports_every_invalid_field() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/parking/occupied"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["A1"])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let output = run(args(
        &server,
        &[
            "register",
            "--no-input",
            "--owner",
            "Jane Doe",
            "--vehicle",
            "Civic",
            "--type",
            "car",
            "--plate",
            "AB123",
            "--slot",
            "A1",
        ],
    ))
    .await;

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Plate number must be like ABC123."), "{stderr}");
    assert!(stderr.contains("Parking slot is already occupied."), "{stderr}");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_timeout_unknown_session_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/transactions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([jane(None)])))
        .mount(&server)
        .await;

    let output = run(args(&server, &["sessions", "timeout", "42"])).await;
    assert_eq!(output.status.code(), Some(4));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_history_delete_sync_failure_is_a_warning() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/history"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([jane(Some("2024-01-01T10:30"))])),
        )
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/transactions/1"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let output = run(args(&server, &["--yes", "history", "delete", "1"])).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Transaction 1 removed"), "{stderr}");
    assert!(stderr.contains("server sync failed"), "{stderr}");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_history_summary_covers_every_row() {
    let server = MockServer::start().await;
    let mut bob = jane(Some("2024-01-01T09:00"));
    bob["id"] = json!(2);
    bob["owner_name"] = json!("Bob");
    Mock::given(method("GET"))
        .and(path("/api/history"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([jane(Some("2024-01-01T10:30")), bob])),
        )
        .mount(&server)
        .await;

    let output = run(args(&server, &["--output", "json", "history", "summary"])).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    let summary: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["sessions"], 2);
    assert_eq!(summary["total_revenue"], 80);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_history_receipt_to_file() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/history"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([jane(Some("2024-01-01T10:30"))])),
        )
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("receipt.html");
    let output = run(args(
        &server,
        &[
            "history",
            "receipt",
            "1",
            "--format",
            "html",
            "--out",
            out.to_str().unwrap(),
        ],
    ))
    .await;

    assert!(output.status.success(), "{}", combined_output(&output));
    let html = std::fs::read_to_string(&out).unwrap();
    assert!(html.contains("ABC123"));
}

#[test]
fn test_unreachable_store_exit_code() {
    parkpro_cmd()
        .args(["--store-url", "http://127.0.0.1:1/api", "slots"])
        .assert()
        .code(7);
}
