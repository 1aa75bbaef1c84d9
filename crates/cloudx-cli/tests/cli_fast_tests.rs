//! CLI tests using assert_cmd against a mockito backend.

#![allow(deprecated)] // assert_cmd::Command::cargo_bin is deprecated but works fine

use assert_cmd::Command;
use mockito::Matcher;
use predicates::prelude::*;
use std::path::Path;

const INVENTORY: &str = r#"{
    "success": true,
    "containers": [
        {"id": "r1", "name": "web", "status": "running", "image": "nginx:latest", "created": "2024-01-01T00:00:00Z"},
        {"id": "s1", "name": "batch", "status": "exited", "image": "<job>", "created": null}
    ]
}"#;

/// `cloudx` pointed at `url` with a config file under `dir`
fn cloudx(dir: &Path, url: &str) -> Command {
    let config = dir.join("config.toml");
    std::fs::write(
        &config,
        format!(
            "[refresh]\ndelay_ms = 10\n\n[logs]\nexport_dir = {:?}\n",
            dir.to_string_lossy()
        ),
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("cloudx").unwrap();
    cmd.arg("--config").arg(&config).arg("--url").arg(url);
    cmd
}

#[test]
fn test_help_flag() {
    Command::cargo_bin("cloudx")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Container control client"));
}

#[test]
fn test_version_flag() {
    Command::cargo_bin("cloudx")
        .unwrap()
        .arg("--version")
        .assert()
        .success();
}

#[test]
fn test_subcommand_help() {
    for subcmd in &[
        "list", "stop", "restart", "start", "delete", "logs", "html", "config",
    ] {
        Command::cargo_bin("cloudx")
            .unwrap()
            .args([subcmd, "--help"])
            .assert()
            .success()
            .stdout(predicate::str::is_empty().not());
    }
}

#[test]
fn test_unknown_subcommand_fails() {
    Command::cargo_bin("cloudx")
        .unwrap()
        .arg("nonexistent-subcommand")
        .assert()
        .failure();
}

#[test]
fn test_invalid_url_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    cloudx(tmp.path(), "ftp://example.com")
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_list_prints_rows_and_counts() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/api/containers")
        .with_header("content-type", "application/json")
        .with_body(INVENTORY)
        .create();
    let tmp = tempfile::tempdir().unwrap();

    cloudx(tmp.path(), &server.url())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("web"))
        .stdout(predicate::str::contains("batch"))
        .stdout(predicate::str::contains("2024-01-01"))
        .stdout(predicate::str::contains("Unknown"))
        .stdout(predicate::str::contains("1 running, 1 stopped"));
    mock.assert();
}

#[test]
fn test_list_backend_failure() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/api/containers")
        .with_body(r#"{"success": false, "error": "daemon down"}"#)
        .create();
    let tmp = tempfile::tempdir().unwrap();

    cloudx(tmp.path(), &server.url())
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Failed to load containers: daemon down",
        ));
}

#[test]
fn test_list_unreachable_backend() {
    let tmp = tempfile::tempdir().unwrap();
    cloudx(tmp.path(), "http://127.0.0.1:9")
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load containers: Request failed"));
}

#[test]
fn test_stop_reports_and_refreshes() {
    let mut server = mockito::Server::new();
    let action = server
        .mock("POST", "/api/containers/r1/action")
        .match_body(Matcher::JsonString(action_body("stop")))
        .with_body(r#"{"success": true}"#)
        .create();
    let list = server
        .mock("GET", "/api/containers")
        .with_body(r#"{"success": true, "containers": [{"id": "r1", "name": "web", "status": "exited"}]}"#)
        .expect(1)
        .create();
    let tmp = tempfile::tempdir().unwrap();

    cloudx(tmp.path(), &server.url())
        .args(["stop", "r1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Container stopped successfully"))
        .stdout(predicate::str::contains("web is now exited"));
    action.assert();
    list.assert();
}

#[test]
fn test_start_sends_restart() {
    let mut server = mockito::Server::new();
    let action = server
        .mock("POST", "/api/containers/s1/action")
        .match_body(Matcher::JsonString(action_body("restart")))
        .with_body(r#"{"success": true}"#)
        .create();
    server
        .mock("GET", "/api/containers")
        .with_body(INVENTORY)
        .create();
    let tmp = tempfile::tempdir().unwrap();

    cloudx(tmp.path(), &server.url())
        .args(["start", "s1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Container restarted successfully"));
    action.assert();
}

#[test]
fn test_action_failure_exits_nonzero() {
    let mut server = mockito::Server::new();
    server
        .mock("POST", "/api/containers/r1/action")
        .with_body(r#"{"success": false, "error": "no such container"}"#)
        .create();
    let list = server.mock("GET", "/api/containers").expect(0).create();
    let tmp = tempfile::tempdir().unwrap();

    cloudx(tmp.path(), &server.url())
        .args(["restart", "r1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Failed to restart container: no such container",
        ))
        .stderr(predicate::str::contains("Error:").not());
    list.assert();
}

#[test]
fn test_delete_with_yes() {
    let mut server = mockito::Server::new();
    let action = server
        .mock("POST", "/api/containers/s1/action")
        .match_body(Matcher::JsonString(action_body("delete")))
        .with_body(r#"{"success": true}"#)
        .create();
    server
        .mock("GET", "/api/containers")
        .with_body(r#"{"success": true, "containers": []}"#)
        .create();
    let tmp = tempfile::tempdir().unwrap();

    cloudx(tmp.path(), &server.url())
        .args(["delete", "s1", "-y"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Container deleted successfully"))
        .stdout(predicate::str::contains("s1 is no longer listed"));
    action.assert();
}

#[test]
fn test_logs_printed() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/api/containers/r1/logs")
        .with_body(r#"{"success": true, "logs": "hello from web"}"#)
        .create();
    let tmp = tempfile::tempdir().unwrap();

    cloudx(tmp.path(), &server.url())
        .args(["logs", "r1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("hello from web"));
}

#[test]
fn test_logs_empty_placeholder() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/api/containers/r1/logs")
        .with_body(r#"{"success": true, "logs": ""}"#)
        .create();
    let tmp = tempfile::tempdir().unwrap();

    cloudx(tmp.path(), &server.url())
        .args(["logs", "r1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No logs available"));
}

#[test]
fn test_logs_export_writes_file() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/api/containers/r1/logs")
        .with_body(r#"{"success": true, "logs": "exported line"}"#)
        .create();
    let tmp = tempfile::tempdir().unwrap();

    cloudx(tmp.path(), &server.url())
        .args(["logs", "r1", "--name", "web", "--export"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Logs downloaded successfully"));

    let exported: Vec<_> = std::fs::read_dir(tmp.path())
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| {
            p.file_name()
                .map(|n| n.to_string_lossy().starts_with("web_logs_"))
                .unwrap_or(false)
        })
        .collect();
    assert_eq!(exported.len(), 1);
    assert_eq!(
        std::fs::read_to_string(&exported[0]).unwrap(),
        "exported line"
    );
}

#[test]
fn test_logs_failure() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/api/containers/r1/logs")
        .with_body(r#"{"success": false}"#)
        .create();
    let tmp = tempfile::tempdir().unwrap();

    cloudx(tmp.path(), &server.url())
        .args(["logs", "r1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to fetch logs"));
}

#[test]
fn test_html_output_is_escaped() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/api/containers")
        .with_body(INVENTORY)
        .create();
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("containers.html");

    cloudx(tmp.path(), &server.url())
        .arg("html")
        .arg("--output")
        .arg(&out)
        .assert()
        .success();

    let html = std::fs::read_to_string(&out).unwrap();
    assert!(html.contains(r#"<span id="runningCount">1</span>"#));
    assert!(html.contains("&lt;job&gt;"));
    assert!(!html.contains("<job>"));
}

#[test]
fn test_config_shows_effective_values() {
    let tmp = tempfile::tempdir().unwrap();
    cloudx(tmp.path(), "http://backend.local:8080")
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("[backend]"))
        .stdout(predicate::str::contains("http://backend.local:8080"))
        .stdout(predicate::str::contains("delay_ms = 10"));
}

fn action_body(action: &str) -> String {
    format!(r#"{{"action":"{}"}}"#, action)
}
