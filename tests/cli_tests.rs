//! Integration tests for the `tomltidy` binary.
//!
//! These run the real binary against files in a temporary directory and check
//! exit status, stdout, and what ends up on disk.

// `Command::cargo_bin` was deprecated in assert_cmd 2.1.2 in favor of
// `cargo::cargo_bin_cmd!`. Allow it until we migrate.
#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const MESSY: &str = "b = 'two'\na   =   [1,2,3]\n[server]\nhost='localhost'\n";
const TIDY: &str = "b = \"two\"\na = [1, 2, 3]\n\n[server]\nhost = \"localhost\"\n";

fn write(path: &Path, contents: &str) {
    fs::write(path, contents).expect("fixture must be writable");
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).expect("fixture must be readable")
}

#[test]
fn rewrites_file_in_place() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("config.toml");
    write(&file, MESSY);

    Command::cargo_bin("tomltidy")
        .unwrap()
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    assert_eq!(read(&file), TIDY);
}

#[test]
fn tidy_file_is_left_alone() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("config.toml");
    write(&file, TIDY);

    Command::cargo_bin("tomltidy")
        .unwrap()
        .arg("--check")
        .arg(&file)
        .assert()
        .success();

    assert_eq!(read(&file), TIDY);
}

#[test]
fn check_reports_without_writing() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("config.toml");
    write(&file, MESSY);

    Command::cargo_bin("tomltidy")
        .unwrap()
        .arg("--check")
        .arg(&file)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("config.toml"));

    assert_eq!(read(&file), MESSY);
}

#[test]
fn sort_keys_and_indent_flags() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("config.toml");
    write(&file, "z = 1\na = 2\n[t.u]\nk = 1\n[t.v]\nk = 2\n");

    Command::cargo_bin("tomltidy")
        .unwrap()
        .args(["--sort-keys", "--indent", "4"])
        .arg(&file)
        .assert()
        .success();

    assert_eq!(
        read(&file),
        "a = 2\nz = 1\n\n[t]\n\n    [t.u]\n    k = 1\n\n    [t.v]\n    k = 2\n"
    );
}

#[test]
fn directories_need_recursive_flag_for_subdirectories() {
    let dir = tempdir().unwrap();
    let top = dir.path().join("top.toml");
    let nested_dir = dir.path().join("nested");
    let nested = nested_dir.join("inner.toml");
    let ignored = dir.path().join("notes.txt");
    fs::create_dir(&nested_dir).unwrap();
    write(&top, MESSY);
    write(&nested, MESSY);
    write(&ignored, MESSY);

    Command::cargo_bin("tomltidy")
        .unwrap()
        .arg(dir.path())
        .assert()
        .success();

    assert_eq!(read(&top), TIDY);
    assert_eq!(read(&nested), MESSY);
    assert_eq!(read(&ignored), MESSY);

    Command::cargo_bin("tomltidy")
        .unwrap()
        .arg("-r")
        .arg(dir.path())
        .assert()
        .success();

    assert_eq!(read(&nested), TIDY);
    assert_eq!(read(&ignored), MESSY);
}

#[test]
fn invalid_file_fails_but_others_are_processed() {
    let dir = tempdir().unwrap();
    let bad = dir.path().join("a_bad.toml");
    let good = dir.path().join("b_good.toml");
    write(&bad, "key = \n");
    write(&good, MESSY);

    Command::cargo_bin("tomltidy")
        .unwrap()
        .arg("-r")
        .arg(dir.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("a_bad.toml"))
        .stderr(predicate::str::contains("missing value"));

    assert_eq!(read(&bad), "key = \n");
    assert_eq!(read(&good), TIDY);
}

#[test]
fn missing_path_is_an_error() {
    let dir = tempdir().unwrap();

    Command::cargo_bin("tomltidy")
        .unwrap()
        .arg(dir.path().join("absent.toml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read file"));
}

#[test]
fn requires_a_path() {
    Command::cargo_bin("tomltidy")
        .unwrap()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}
