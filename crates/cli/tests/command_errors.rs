mod common;

use std::fs;

use predicates::str::contains;
use tempfile::tempdir;

use common::seed_global;

/// A subcommand is required.
#[test]
fn missing_subcommand_fails() {
    assert_cmd::cargo::cargo_bin_cmd!("samplebank").assert().failure();
}

#[test]
fn shrink_without_max_count_fails() {
    let dir = tempdir().expect("tempdir");
    seed_global(dir.path());

    assert_cmd::cargo::cargo_bin_cmd!("samplebank")
        .arg("--root")
        .arg(dir.path())
        .arg("shrink")
        .assert()
        .failure()
        .stderr(contains("No maximum count"));
}

#[test]
fn include_rejects_missing_and_misnamed_archives() {
    let dir = tempdir().expect("tempdir");

    assert_cmd::cargo::cargo_bin_cmd!("samplebank")
        .arg("--root")
        .arg(dir.path())
        .arg("include")
        .arg("--from")
        .arg(dir.path().join("other-samples.db"))
        .assert()
        .failure()
        .stderr(contains("Failed to include"));

    assert_cmd::cargo::cargo_bin_cmd!("samplebank")
        .arg("--root")
        .arg(dir.path())
        .arg("include")
        .arg("--from")
        .arg(dir.path().join("notes.txt"))
        .assert()
        .failure()
        .stderr(contains("notes.txt"));
}

#[test]
fn malformed_config_fails_every_command() {
    let dir = tempdir().expect("tempdir");
    fs::write(dir.path().join("repository.json"), "{ nope").expect("write config");

    assert_cmd::cargo::cargo_bin_cmd!("samplebank")
        .arg("--root")
        .arg(dir.path())
        .arg("info")
        .assert()
        .failure()
        .stderr(contains("Failed to parse repository config JSON"));
}

/// An unreadable archive is reported by `info`, and updates refuse to overwrite it.
#[test]
fn unreadable_archive_is_reported_and_protected() {
    let dir = tempdir().expect("tempdir");
    let garbage = vec![0x42_u8; 4096];
    fs::write(dir.path().join("samples.db"), &garbage).expect("write garbage");

    assert_cmd::cargo::cargo_bin_cmd!("samplebank")
        .arg("--root")
        .arg(dir.path())
        .arg("info")
        .assert()
        .success()
        .stdout(contains("Loaded: no"))
        .stdout(contains("Load failure:"));

    assert_cmd::cargo::cargo_bin_cmd!("samplebank")
        .arg("--root")
        .arg(dir.path())
        .arg("purge")
        .assert()
        .failure()
        .stderr(contains("Cannot update"));

    let after = fs::read(dir.path().join("samples.db")).expect("read archive");
    assert_eq!(after, garbage);
}
