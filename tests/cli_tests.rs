//! CLI integration tests

use assert_cmd::Command;
use predicates::prelude::*;

fn streamscribe() -> Command {
    Command::cargo_bin("streamscribe").unwrap()
}

#[test]
fn help_lists_transcription_options() {
    streamscribe()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--model"))
        .stdout(predicate::str::contains("--language"))
        .stdout(predicate::str::contains("transcription"));
}

#[test]
fn version_flag_works() {
    streamscribe()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("streamscribe"));
}

#[test]
fn config_help_lists_actions() {
    streamscribe()
        .args(["config", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("set"))
        .stdout(predicate::str::contains("get"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("path"));
}

#[test]
fn config_path_points_at_streamscribe_toml() {
    streamscribe()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("streamscribe"))
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn config_get_unknown_key_fails() {
    streamscribe()
        .args(["config", "get", "invalid_key"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown key"));
}

#[test]
fn config_set_unknown_key_fails() {
    streamscribe()
        .args(["config", "set", "invalid_key", "value"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown key"));
}
