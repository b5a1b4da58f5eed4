use std::fs;

use samplebank::{canonicalize_or_current, default_log_filter};
use tempfile::tempdir;

#[test]
fn canonicalize_or_current_returns_cwd_for_dot() {
    let result = canonicalize_or_current(".").expect("canonicalize");
    assert_eq!(result, std::env::current_dir().expect("cwd"));
}

#[test]
fn canonicalize_or_current_resolves_existing_path() {
    let tmp = tempdir().expect("tempdir");
    let subdir = tmp.path().join("nested");
    fs::create_dir_all(&subdir).expect("create nested");

    let result = canonicalize_or_current(subdir.to_str().expect("utf8 path")).expect("canonicalize");
    assert_eq!(result, subdir.canonicalize().expect("canonicalize subdir"));
}

#[test]
fn canonicalize_or_current_keeps_missing_paths() {
    let tmp = tempdir().expect("tempdir");
    let missing = tmp.path().join("not-yet");

    let result = canonicalize_or_current(missing.to_str().expect("utf8 path")).expect("resolve");
    assert!(result.ends_with("not-yet"));
    assert!(result.is_absolute());
}

#[test]
fn verbose_switches_the_default_log_filter() {
    assert_eq!(default_log_filter(false), "warn");
    assert!(default_log_filter(true).contains("samplebank_core=debug"));
}
