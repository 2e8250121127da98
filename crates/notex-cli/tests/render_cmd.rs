use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::tempdir;

#[test]
fn test_render_typesets_markup() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("notes.txt");
    fs::write(
        &file,
        "A body at speed \\(v = u + at\\) keeps accelerating.\n\n\\[s = ut + \\frac{1}{2}at^2\\]",
    )
    .unwrap();

    cargo_bin_cmd!("notex")
        .env("NOTEX_HOME", dir.path())
        .args(["render", file.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("A body at speed v = u + at"))
        .stdout(predicate::str::contains("s = ut + \\frac{1}{2}at^2"));
}

#[test]
fn test_render_raw_keeps_delimiters() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("notes.txt");
    let source = "**Newton** wrote \\(F = ma\\)";
    fs::write(&file, source).unwrap();

    cargo_bin_cmd!("notex")
        .env("NOTEX_HOME", dir.path())
        .args(["render", file.to_str().unwrap(), "--raw"])
        .assert()
        .success()
        .stdout(predicate::str::contains(source));
}

#[test]
fn test_render_flags_bad_math_without_failing() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("notes.txt");
    fs::write(&file, "fine text \\(\\frac{1\\) more fine text").unwrap();

    cargo_bin_cmd!("notex")
        .env("NOTEX_HOME", dir.path())
        .args(["render", file.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("⚠"))
        .stdout(predicate::str::contains("more fine text"));
}

#[test]
fn test_render_missing_file_fails() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("notex")
        .env("NOTEX_HOME", dir.path())
        .args(["render", "no-such-file.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no-such-file.txt"));
}
