//! End-to-end tests for the complete edit timer flow.
//!
//! Drives the `et` binary: a `run` session fed with host events, then the
//! one-shot commands reading and adjusting what it saved.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

fn et_binary() -> String {
    env!("CARGO_BIN_EXE_et").to_string()
}

/// Builds an `et` command isolated inside `temp`.
fn et(temp: &Path) -> Command {
    let mut cmd = Command::new(et_binary());
    cmd.env("HOME", temp)
        .env("XDG_CONFIG_HOME", temp.join(".config"))
        .env("XDG_DATA_HOME", temp.join(".local/share"))
        .env("ET_DATABASE_PATH", temp.join("data/et.db"));
    cmd
}

fn run_ok(cmd: &mut Command) -> Output {
    let output = cmd.output().expect("failed to run et");
    assert!(
        output.status.success(),
        "et should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    output
}

/// Runs a session that reads `events` and exits at end of input.
fn run_session(temp: &Path, events: &str) {
    let mut child = et(temp)
        .arg("run")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn et run");

    {
        let stdin = child.stdin.as_mut().unwrap();
        stdin.write_all(events.as_bytes()).unwrap();
    }

    let output = child.wait_with_output().expect("failed to wait for et run");
    assert!(
        output.status.success(),
        "et run failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

fn report_json(temp: &Path) -> serde_json::Value {
    let output = run_ok(et(temp).args(["report", "--json"]));
    serde_json::from_slice(&output.stdout).expect("report should be valid JSON")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[test]
fn test_session_records_time_per_file() {
    let temp = TempDir::new().unwrap();
    run_session(
        temp.path(),
        r#"{"type": "focus", "path": "/repo/a.txt", "at": 0}
{"type": "focus", "path": "/repo/b.txt", "at": 400}
{"type": "focus", "path": null, "at": 500}
"#,
    );

    assert!(temp.path().join("data/et.db").exists());

    let report = report_json(temp.path());
    assert_eq!(report["total_ms"], 500);
    assert_eq!(report["files"][0]["path"], "/repo/a.txt");
    assert_eq!(report["files"][0]["elapsed_ms"], 400);
    assert_eq!(report["files"][1]["path"], "/repo/b.txt");
    assert_eq!(report["files"][1]["elapsed_ms"], 100);
}

#[test]
fn test_second_session_adds_to_saved_time() {
    let temp = TempDir::new().unwrap();
    run_session(
        temp.path(),
        r#"{"type": "focus", "path": "/repo/a.txt", "at": 0}
{"type": "focus", "path": null, "at": 1000}
"#,
    );
    run_session(
        temp.path(),
        r#"{"type": "focus", "path": "/repo/a.txt", "at": 50000}
{"type": "focus", "path": null, "at": 50500}
"#,
    );

    let report = report_json(temp.path());
    assert_eq!(report["total_ms"], 1500);
    assert_eq!(report["files"][0]["elapsed_ms"], 1500);
}

#[test]
fn test_exclude_hides_file_from_report() {
    let temp = TempDir::new().unwrap();
    run_session(
        temp.path(),
        r#"{"type": "focus", "path": "/repo/a.txt", "at": 0}
{"type": "focus", "path": "/repo/b.txt", "at": 400}
{"type": "focus", "path": null, "at": 500}
"#,
    );

    let output = run_ok(et(temp.path()).args(["exclude", "toggle", "/repo/a.txt"]));
    assert_eq!(stdout(&output), "a.txt is now excluded\n");

    let output = run_ok(et(temp.path()).args(["exclude", "list"]));
    assert_eq!(stdout(&output), "/repo/a.txt\n");

    let report = report_json(temp.path());
    assert_eq!(report["total_ms"], 100);
    assert_eq!(report["files"].as_array().unwrap().len(), 1);

    run_ok(et(temp.path()).args(["exclude", "remove", "/repo/a.txt"]));
    let report = report_json(temp.path());
    assert_eq!(report["total_ms"], 500);
}

#[test]
fn test_pause_blocks_session_time() {
    let temp = TempDir::new().unwrap();
    let output = run_ok(et(temp.path()).arg("pause"));
    assert_eq!(stdout(&output), "Tracking paused.\n");

    run_session(
        temp.path(),
        r#"{"type": "focus", "path": "/repo/a.txt", "at": 0}
{"type": "focus", "path": null, "at": 900}
"#,
    );

    let report = report_json(temp.path());
    assert_eq!(report["total_ms"], 0);
    assert_eq!(report["is_tracking"], false);

    run_ok(et(temp.path()).arg("resume"));
    let output = run_ok(et(temp.path()).arg("status"));
    assert!(stdout(&output).contains("Tracking: on"));
}

#[test]
fn test_reset_requires_confirmation() {
    let temp = TempDir::new().unwrap();
    run_session(
        temp.path(),
        r#"{"type": "focus", "path": "/repo/a.txt", "at": 0}
{"type": "focus", "path": null, "at": 2000}
"#,
    );

    let output = et(temp.path()).arg("reset").output().unwrap();
    assert!(!output.status.success());
    assert_eq!(report_json(temp.path())["total_ms"], 2000);

    run_ok(et(temp.path()).args(["reset", "--yes"]));
    assert_eq!(report_json(temp.path())["total_ms"], 0);
}

#[test]
fn test_status_without_data() {
    let temp = TempDir::new().unwrap();
    let output = run_ok(et(temp.path()).arg("status"));
    let out = stdout(&output);
    assert!(out.contains("Edit timer status"));
    assert!(out.contains("No timer data recorded."));
}
