use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn help_lists_playback_flags() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("clipbus"));
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--volume"))
        .stdout(predicate::str::contains("--speed"))
        .stdout(predicate::str::contains("--loop"))
        .stdout(predicate::str::contains("--seek"));
}

#[test]
fn no_arguments_shows_usage() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("clipbus"));
    cmd.assert().failure().stderr(predicate::str::contains("Usage"));
}

#[test]
fn missing_input_file_reports_io_error() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("clipbus"));
    cmd.arg("definitely-not-here.wav")
        .assert()
        .failure()
        .stderr(predicate::str::contains("io error"));
}
