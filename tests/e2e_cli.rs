//! CLI end-to-end tests
//!
//! Tests for the dubforge command-line interface. None of these need
//! yt-dlp, ffmpeg or network access.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

/// Get a command for the dubforge binary
#[allow(deprecated)]
fn dubforge_cmd() -> Command {
    Command::cargo_bin("dubforge").unwrap()
}

#[test]
fn test_cli_no_args_shows_help() {
    let mut cmd = dubforge_cmd();
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_cli_help_flag() {
    let mut cmd = dubforge_cmd();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("dubforge"))
        .stdout(predicate::str::contains("Usage"));
}

#[test]
fn test_cli_version_command() {
    let mut cmd = dubforge_cmd();
    cmd.arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(concat!(
            "dubforge ",
            env!("CARGO_PKG_VERSION")
        )));
}

#[test]
fn test_cli_run_help() {
    let mut cmd = dubforge_cmd();
    cmd.args(["run", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--actions"))
        .stdout(predicate::str::contains("--audio"))
        .stdout(predicate::str::contains("--target-lang"));
}

#[test]
fn test_cli_run_requires_url() {
    let mut cmd = dubforge_cmd();
    cmd.arg("run").assert().failure();
}

#[test]
fn test_cli_trim_requires_timecodes() {
    let mut cmd = dubforge_cmd();
    cmd.args(["trim", "clip.mp4"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--start"));
}

#[test]
fn test_cli_config_validation() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("dubforge.toml");
    fs::write(
        &config_path,
        r#"
[settings]
source_lang = "en"
target_lang = "de"
subtitle_format = ".srt"

[output]
dir = "/tmp/dubforge-out"
"#,
    )
    .unwrap();

    let mut cmd = dubforge_cmd();
    cmd.arg("validate")
        .arg(&config_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"))
        .stdout(predicate::str::contains("Languages: en -> de"))
        .stdout(predicate::str::contains("Subtitles: en (srt)"));
}

#[test]
fn test_cli_invalid_config_fails() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("dubforge.toml");
    fs::write(&config_path, "[settings]\nno_such_key = 1\n").unwrap();

    let mut cmd = dubforge_cmd();
    cmd.arg("validate")
        .arg(&config_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no_such_key"));
}

#[test]
fn test_cli_run_with_unknown_actions_aborts() {
    let dir = tempdir().unwrap();

    let mut cmd = dubforge_cmd();
    cmd.current_dir(dir.path())
        .args(["run", "https://video.example/watch?v=abc", "-a", "bogus"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("[url] status: running"))
        .stdout(predicate::str::contains("no valid actions"))
        .stdout(predicate::str::contains("[url] status: error"));

    // Nothing was written.
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_cli_run_json_events() {
    let dir = tempdir().unwrap();

    let mut cmd = dubforge_cmd();
    cmd.current_dir(dir.path())
        .args(["run", "https://video.example/watch?v=abc", "-a", "bogus", "--json"])
        .assert()
        .failure()
        .stdout(predicate::str::contains(r#""origin":"url""#))
        .stdout(predicate::str::contains(r#""type":"status""#))
        .stdout(predicate::str::contains(r#""status":"error""#));
}

#[test]
fn test_cli_trim_invalid_timecode() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("clip.mp4");
    fs::write(&input, "not really media").unwrap();

    let mut cmd = dubforge_cmd();
    cmd.current_dir(dir.path())
        .arg("trim")
        .arg(&input)
        .args(["--start", "1:2:3", "--end", "00:00:10"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("[trim] status: error"));
}
