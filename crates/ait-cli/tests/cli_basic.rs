//! Basic CLI E2E tests.
//!
//! Tests invoke the built binary with HOME pointed at a scratch directory
//! so the user's real config is never touched.

use std::io::Write;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

/// Run a CLI command against `home` and return (code, stdout, stderr).
fn run_cli(home: &std::path::Path, args: &[&str]) -> (i32, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_ait-cli"))
        .args(args)
        .env("HOME", home)
        .env_remove("AIT_ENV")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (code, stdout, stderr)
}

#[test]
fn test_total_with_overrides() {
    let home = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli(
        home.path(),
        &["total", "--countdown", "5", "--intervals", "3", "--active", "20", "--rest", "10"],
    );
    assert_eq!(code, 0, "total failed");
    assert!(stdout.contains("01:35.0"), "unexpected output: {stdout}");
}

#[test]
fn test_total_of_default_program() {
    let home = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli(home.path(), &["total"]);
    assert_eq!(code, 0, "total failed");
    // 5s countdown + 8 x (20s + 10s)
    assert!(stdout.contains("Program #1: 04:05.0"), "unexpected output: {stdout}");
}

#[test]
fn test_invalid_warning_threshold_fails() {
    let home = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run_cli(home.path(), &["total", "--warn", "7"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("unsupported warning threshold"));
}

#[test]
fn test_zero_intervals_rejected() {
    let home = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run_cli(home.path(), &["total", "--intervals", "0"]);
    assert_eq!(code, 1);
    assert!(stderr.starts_with("error:"), "unexpected stderr: {stderr}");
}

#[test]
fn test_config_get_and_set() {
    let home = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli(home.path(), &["config", "get", "timer.resolution"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "10");

    let (code, _, _) = run_cli(home.path(), &["config", "set", "timer.resolution", "5"]);
    assert_eq!(code, 0, "config set failed");
    let (_, stdout, _) = run_cli(home.path(), &["config", "get", "timer.resolution"]);
    assert_eq!(stdout.trim(), "5");

    let (code, _, _) = run_cli(home.path(), &["config", "set", "timer.resolution", "3"]);
    assert_eq!(code, 1, "unsupported resolution accepted");
}

#[test]
fn test_config_get_unknown_key() {
    let home = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run_cli(home.path(), &["config", "get", "signal.nope"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("unknown key"));
}

#[test]
fn test_program_add_list_remove() {
    let home = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli(
        home.path(),
        &["program", "add", "--name", "Tabata", "--intervals", "8", "--active", "20", "--rest", "10"],
    );
    assert_eq!(code, 0, "program add failed");
    let uuid = stdout.trim().to_string();

    let (code, stdout, _) = run_cli(home.path(), &["program", "list", "--json"]);
    assert_eq!(code, 0);
    let programs: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let names: Vec<&str> = programs
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Program #1", "Tabata"]);

    let (code, _, _) = run_cli(home.path(), &["program", "remove", &uuid]);
    assert_eq!(code, 0, "program remove failed");
    let (code, _, _) = run_cli(home.path(), &["program", "remove", &uuid]);
    assert_eq!(code, 1, "second remove should fail");
}

#[test]
fn test_run_json_emits_every_tick() {
    let home = tempfile::tempdir().unwrap();
    let (code, stdout, stderr) = run_cli(
        home.path(),
        &[
            "run", "--no-input", "--json", "--countdown", "0", "--intervals", "1", "--active", "1",
            "--rest", "0",
        ],
    );
    assert_eq!(code, 0, "run failed: {stderr}");

    let ticks: Vec<serde_json::Value> = stdout
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(ticks.len(), 11);
    assert_eq!(ticks[0]["remaining_time_text"], "00:01.0");
    assert_eq!(ticks[10]["remaining_time_text"], "00:00.0");
    assert!(stderr.contains("workout complete"));
}

#[test]
fn test_run_quits_on_q() {
    let home = tempfile::tempdir().unwrap();
    let mut child = Command::new(env!("CARGO_BIN_EXE_ait-cli"))
        .args(["run", "--countdown", "0", "--intervals", "1", "--active", "60", "--rest", "0"])
        .env("HOME", home.path())
        .env_remove("AIT_ENV")
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .expect("Failed to spawn CLI");

    std::thread::sleep(Duration::from_millis(500));
    let mut stdin = child.stdin.take().unwrap();
    stdin.write_all(b"q\n").unwrap();

    let deadline = Instant::now() + Duration::from_secs(10);
    let status = loop {
        if let Some(status) = child.try_wait().unwrap() {
            break status;
        }
        if Instant::now() > deadline {
            child.kill().unwrap();
            panic!("run kept going after q");
        }
        std::thread::sleep(Duration::from_millis(50));
    };
    drop(stdin);
    assert!(status.success());
}

#[test]
fn test_run_rings_bell_unless_muted() {
    let home = tempfile::tempdir().unwrap();
    let workout = [
        "run", "--no-input", "--countdown", "0", "--intervals", "1", "--active", "1", "--rest", "0",
    ];

    let (code, _, stderr) = run_cli(home.path(), &workout);
    assert_eq!(code, 0, "run failed: {stderr}");
    assert!(stderr.contains('\x07'), "no bell rang");

    let (code, _, _) = run_cli(home.path(), &["config", "set", "signal.sound", "0"]);
    assert_eq!(code, 0, "config set failed");
    let (code, _, stderr) = run_cli(home.path(), &workout);
    assert_eq!(code, 0, "run failed: {stderr}");
    assert!(stderr.contains("workout complete"));
    assert!(!stderr.contains('\x07'), "bell rang while muted");
}

#[test]
fn test_removing_current_program_resets_current() {
    let home = tempfile::tempdir().unwrap();
    let (_, stdout, _) = run_cli(home.path(), &["program", "add", "--name", "Tabata"]);
    let uuid = stdout.trim().to_string();
    let (code, _, _) = run_cli(home.path(), &["config", "set", "current_uuid", &uuid]);
    assert_eq!(code, 0, "config set failed");

    let (code, _, _) = run_cli(home.path(), &["program", "remove", &uuid]);
    assert_eq!(code, 0, "program remove failed");
    let (_, stdout, _) = run_cli(home.path(), &["config", "get", "current_uuid"]);
    assert_eq!(stdout.trim(), "00000000-0000-0000-0000-000000000001");

    // The removed program does not come back on the next run
    let (_, stdout, _) = run_cli(home.path(), &["total"]);
    assert!(stdout.starts_with("Program #1:"), "unexpected output: {stdout}");
    let (_, stdout, _) = run_cli(home.path(), &["program", "list", "--json"]);
    assert!(!stdout.contains(&uuid));
}
