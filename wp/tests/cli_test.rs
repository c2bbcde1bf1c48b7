//! CLI smoke tests
//!
//! Network-touching commands are not exercised here; these only verify the
//! argument surface.

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_help_lists_subcommands() {
    let mut cmd = Command::cargo_bin("wp").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("history"))
        .stdout(predicate::str::contains("bookings"))
        .stdout(predicate::str::contains("health"));
}

#[test]
fn test_version_flag() {
    let mut cmd = Command::cargo_bin("wp").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.1.0"));
}

#[test]
fn test_unknown_subcommand_fails() {
    let mut cmd = Command::cargo_bin("wp").unwrap();
    cmd.arg("definitely-not-a-command").assert().failure();
}

#[test]
fn test_history_rejects_bad_limit() {
    let mut cmd = Command::cargo_bin("wp").unwrap();
    cmd.args(["history", "--limit", "not-a-number"]).assert().failure();
}
