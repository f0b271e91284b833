//! Smoke tests over the compiled `gpk` binary, exercising `clap`'s parsing
//! and the `core::user_friendly_error` rendering end-to-end.

use assert_cmd::Command;
use predicates::prelude::*;

fn gpk(temp: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("gpk").unwrap();
    cmd.current_dir(temp).env("GPK_HOME", temp.join("gpk-home"));
    cmd
}

#[test]
fn init_creates_manifest_named_after_directory() {
    let temp = tempfile::tempdir().unwrap();

    gpk(temp.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("created package.json"));

    assert!(temp.path().join("package.json").exists());
}

#[test]
fn init_refuses_second_call_without_force() {
    let temp = tempfile::tempdir().unwrap();
    gpk(temp.path()).arg("init").assert().success();

    gpk(temp.path())
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn run_reports_missing_script() {
    let temp = tempfile::tempdir().unwrap();
    gpk(temp.path()).arg("init").assert().success();

    gpk(temp.path())
        .args(["run", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no script named"));
}

#[test]
fn test_alias_runs_the_test_script() {
    let temp = tempfile::tempdir().unwrap();
    std::fs::write(
        temp.path().join("package.json"),
        r#"{"name": "demo", "scripts": {"test": "exit 0"}}"#,
    )
    .unwrap();

    gpk(temp.path()).arg("t").assert().success();
}

#[test]
fn install_without_a_manifest_suggests_init() {
    let temp = tempfile::tempdir().unwrap();

    gpk(temp.path())
        .arg("install")
        .assert()
        .failure()
        .stderr(predicate::str::contains("gpk init"));
}
