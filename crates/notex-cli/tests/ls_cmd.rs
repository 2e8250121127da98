use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::tempdir;

#[test]
fn test_ls_exams_uses_builtin_catalog() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("notex")
        .env("NOTEX_HOME", dir.path())
        .args(["ls", "exam"])
        .assert()
        .success()
        .stdout(predicate::str::contains("jee"))
        .stdout(predicate::str::contains("NEET"));
}

#[test]
fn test_ls_children_scoped_by_parent() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("notex")
        .env("NOTEX_HOME", dir.path())
        .args(["ls", "courses", "--parent", "jee"])
        .assert()
        .success()
        .stdout(predicate::str::contains("jee-advanced"))
        .stdout(predicate::str::contains("neet-ug").not());
}

#[test]
fn test_ls_below_root_requires_parent() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("notex")
        .env("NOTEX_HOME", dir.path())
        .args(["ls", "course"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--parent"));
}

#[test]
fn test_ls_rejects_unknown_level() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("notex")
        .env("NOTEX_HOME", dir.path())
        .args(["ls", "semester"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown level"));
}
