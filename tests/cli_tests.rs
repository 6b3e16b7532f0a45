//! Binary-level behavior: the pre-flight usage error is the only non-zero
//! exit, and it leaves no artifacts behind.

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_missing_target_is_a_usage_error_with_no_side_effects() {
    let dir = tempfile::tempdir().unwrap();

    Command::cargo_bin("reconpipe")
        .unwrap()
        .current_dir(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));

    // Nothing was created before the pre-flight error
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_help_exits_cleanly() {
    Command::cargo_bin("reconpipe")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Target domain"));
}

#[test]
fn test_zero_jobs_rejected_before_any_work() {
    let dir = tempfile::tempdir().unwrap();

    Command::cargo_bin("reconpipe")
        .unwrap()
        .current_dir(dir.path())
        .args(["example.com", "--jobs", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Jobs must be greater than 0"));

    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_init_writes_config_template() {
    let dir = tempfile::tempdir().unwrap();

    Command::cargo_bin("reconpipe")
        .unwrap()
        .current_dir(dir.path())
        .arg("--init")
        .assert()
        .success();

    let config = std::fs::read_to_string(dir.path().join("reconpipe.toml")).unwrap();
    assert!(config.contains("[tools]"));
    assert!(config.contains("subfinder"));
}
