//! Black-box tests of the `auto-deprecate` binary.
#![allow(clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const SOURCE: &str = "\
from auto_deprecator import deprecate


@deprecate(expiry='2.0.0', relocate='new_api')
def old_api():
    pass


def new_api():
    # auto-deprecate: expiry=9.0.0
    pass
";

const REWRITTEN: &str = "\
def new_api():
    # auto-deprecate: expiry=9.0.0
    pass
";

fn project() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("pkg")).unwrap();
    fs::write(dir.path().join("pkg").join("api.py"), SOURCE).unwrap();
    fs::write(dir.path().join("pkg").join("__init__.py"), "__version__ = \"2.1.0\"\n").unwrap();
    dir
}

fn cmd(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("auto-deprecate").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("DEPRECATE_VERSION")
        .env("NO_COLOR", "1");
    cmd
}

#[test]
fn test_rewrites_in_place() -> anyhow::Result<()> {
    let dir = project();
    cmd(&dir)
        .args(["pkg", "--deprecate-version", "2.1.0", "--quiet"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "[SUMMARY] 2 files scanned, 1 changed, 1 declarations removed, 0 errors",
        ));
    assert_eq!(fs::read_to_string(dir.path().join("pkg/api.py"))?, REWRITTEN);
    Ok(())
}

#[test]
fn test_dry_run_leaves_files_alone() -> anyhow::Result<()> {
    let dir = project();
    cmd(&dir)
        .args(["pkg", "--deprecate-version", "2.1.0", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[DRY-RUN] Would rewrite:"));
    assert_eq!(fs::read_to_string(dir.path().join("pkg/api.py"))?, SOURCE);
    Ok(())
}

#[test]
fn test_check_fails_when_changes_are_pending() -> anyhow::Result<()> {
    let dir = project();
    cmd(&dir)
        .args(["pkg", "--deprecate-version", "2.1.0", "--check", "--quiet"])
        .assert()
        .code(1);
    assert_eq!(fs::read_to_string(dir.path().join("pkg/api.py"))?, SOURCE);

    cmd(&dir)
        .args(["pkg", "--deprecate-version", "1.0", "--check", "--quiet"])
        .assert()
        .success();
    Ok(())
}

#[test]
fn test_version_source_module() -> anyhow::Result<()> {
    let dir = project();
    cmd(&dir)
        .args(["pkg/api.py", "--version-source", "pkg", "--root", "."])
        .assert()
        .success()
        .stdout(predicate::str::contains("Current version 2.1.0"));
    assert_eq!(fs::read_to_string(dir.path().join("pkg/api.py"))?, REWRITTEN);
    Ok(())
}

#[test]
fn test_environment_override_wins() -> anyhow::Result<()> {
    let dir = project();
    cmd(&dir)
        .env("DEPRECATE_VERSION", "1.5")
        .args(["pkg", "--deprecate-version", "2.1.0", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"origin\": \"override\""));
    assert_eq!(fs::read_to_string(dir.path().join("pkg/api.py"))?, SOURCE);
    Ok(())
}

#[test]
fn test_json_report() -> anyhow::Result<()> {
    let dir = project();
    let output = cmd(&dir)
        .args(["pkg/api.py", "--deprecate-version", "2.1.0", "--json", "--dry-run"])
        .output()?;
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(json["files_scanned"], 1);
    let removed = &json["files"][0]["removed"][0];
    assert_eq!(removed["name"], "old_api");
    assert_eq!(removed["kind"], "function");
    assert_eq!(removed["relocate"], "new_api");
    Ok(())
}

#[test]
fn test_missing_version_exits_with_config_error() {
    let dir = project();
    cmd(&dir)
        .args(["pkg"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_parse_error_is_reported_per_file() -> anyhow::Result<()> {
    let dir = project();
    fs::write(dir.path().join("pkg").join("broken.py"), "def broken(:\n")?;
    cmd(&dir)
        .args(["pkg", "--deprecate-version", "2.1.0"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("broken.py"));
    // Other files are still rewritten
    assert_eq!(fs::read_to_string(dir.path().join("pkg/api.py"))?, REWRITTEN);
    Ok(())
}

#[test]
fn test_excluded_folder_is_skipped() -> anyhow::Result<()> {
    let dir = project();
    cmd(&dir)
        .args([".", "--deprecate-version", "2.1.0", "--exclude", "pkg", "--quiet"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0 files scanned"));
    assert_eq!(fs::read_to_string(dir.path().join("pkg/api.py"))?, SOURCE);
    Ok(())
}

#[test]
fn test_help_mentions_environment_override() {
    Command::cargo_bin("auto-deprecate")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("DEPRECATE_VERSION"));
}
