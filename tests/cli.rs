//! End-to-end tests for the `mascot` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn mascot(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("mascot").unwrap();
    cmd.arg("--config").arg(dir.path().join("settings.toml"));
    cmd
}

#[test]
fn test_status_reports_mood() {
    let dir = TempDir::new().unwrap();
    mascot(&dir)
        .write_stdin("mood happy\nstatus\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"mood\":\"happy\""))
        .stdout(predicate::str::contains("\"last_sound\":\"giggle-soft\""));
}

#[test]
fn test_dialogue_round_trip() {
    let dir = TempDir::new().unwrap();
    mascot(&dir)
        .write_stdin("say hello there\nnext\nnext\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("hello there"))
        .stdout(predicate::str::contains("(nothing to say)"));
}

#[test]
fn test_unknown_mood_reported() {
    let dir = TempDir::new().unwrap();
    mascot(&dir)
        .write_stdin("mood grumpy\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Unknown mood 'grumpy'"));
}

#[test]
fn test_initial_mood_flag() {
    let dir = TempDir::new().unwrap();
    mascot(&dir)
        .args(["--mood", "sleepy"])
        .write_stdin("wake\nstatus\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"mood\":\"idle\""));
}

#[test]
fn test_invalid_settings_file_fails() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("settings.toml"), "dialogue_capacity = 0\n").unwrap();
    mascot(&dir).write_stdin("quit\n").assert().failure();
}
