//! Basic CLI E2E tests.
//!
//! Each test runs the built binary with HOME pointed at a fresh temp directory,
//! so config and timer snapshots never touch the real data directory.

use std::io::{BufRead, BufReader};
use std::process::{Command, Stdio};
use tempfile::TempDir;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(home: &TempDir, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_bosswatch"))
        .args(args)
        .env("HOME", home.path())
        .env_remove("BOSSWATCH_ENV")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

#[test]
fn test_status_json_on_fresh_home() {
    let home = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(&home, &["status", "--json"]);
    assert_eq!(code, 0, "status failed");

    let slots: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let slots = slots.as_array().unwrap();
    assert_eq!(slots.len(), 24);
    assert!(slots.iter().all(|s| s["state"] == "idle"));
}

#[test]
fn test_kill_persists_countdown() {
    let home = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(&home, &["kill", "subora", "4", "--duration", "10"]);
    assert_eq!(code, 0, "kill failed");
    assert!(stdout.contains("Subora channel 4: respawn in 00:10"));

    let (stdout, _, code) = run_cli(&home, &["status", "--json"]);
    assert_eq!(code, 0);
    let slots: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let slot = slots
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["entity"] == "Subora" && s["channel"] == 3)
        .unwrap();
    assert_eq!(slot["state"], "counting");
    assert_eq!(slot["remaining_secs"], 10);
}

#[test]
fn test_kill_with_bad_duration_uses_default() {
    let home = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(&home, &["kill", "Nazrudin", "1", "--duration", "soon"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("respawn in 1:00:00"));
}

#[test]
fn test_kill_unknown_boss_fails() {
    let home = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(&home, &["kill", "Kzarka", "1"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("Unknown entity"));
}

#[test]
fn test_kill_channel_out_of_range_fails() {
    let home = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(&home, &["kill", "Subora", "9"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("out of range"));
}

#[test]
fn test_config_set_and_get() {
    let home = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(&home, &["config", "get", "tracker.channel_count"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "8");

    let (_, _, code) = run_cli(&home, &["config", "set", "tracker.channel_count", "4"]);
    assert_eq!(code, 0);

    let (stdout, _, _) = run_cli(&home, &["status"]);
    let header = stdout.lines().next().unwrap();
    assert!(header.contains("Ch4"));
    assert!(!header.contains("Ch5"));
}

#[test]
fn test_config_set_rejects_invalid_value() {
    let home = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(&home, &["config", "set", "tracker.channel_count", "0"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("tracker.channel_count"));
}

#[test]
fn test_kill_is_refused_while_watch_runs() {
    let home = TempDir::new().unwrap();
    let mut watch = Command::new(env!("CARGO_BIN_EXE_bosswatch"))
        .arg("watch")
        .env("HOME", home.path())
        .env_remove("BOSSWATCH_ENV")
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to start watch");

    // The command help is printed once the watcher owns the state file.
    let mut watch_stderr = BufReader::new(watch.stderr.take().unwrap()).lines();
    let ready = watch_stderr
        .by_ref()
        .map_while(Result::ok)
        .any(|line| line.starts_with("commands:"));
    assert!(ready, "watch exited before it was ready");

    let (_, stderr, code) = run_cli(&home, &["kill", "Subora", "1"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("locked by another running bosswatch process"));

    let (_, _, code) = run_cli(&home, &["status", "--json"]);
    assert_eq!(code, 0, "status must work alongside watch");

    watch.kill().unwrap();
    watch.wait().unwrap();

    let (_, _, code) = run_cli(&home, &["kill", "Subora", "1"]);
    assert_eq!(code, 0, "kill failed after watch exited");
}
