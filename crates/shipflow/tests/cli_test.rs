use assert_cmd::Command;
use predicates::prelude::*;

/// Top-level help lists every subcommand.
#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("ship").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Bootstrap a FastAPI app"))
        .stdout(predicate::str::contains("up"))
        .stdout(predicate::str::contains("scaffold"))
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("destroy"));
}

/// Version output names the package.
#[test]
fn test_cli_version() {
    let mut cmd = Command::cargo_bin("ship").unwrap();
    cmd.arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("shipflow"));
}

/// `up` exposes the app-name positional and the skip-confirmation flag.
#[test]
fn test_up_help() {
    let mut cmd = Command::cargo_bin("ship").unwrap();
    cmd.arg("up")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("[APP_NAME]"))
        .stdout(predicate::str::contains("--yes"))
        .stdout(predicate::str::contains("--resource-group"))
        .stdout(predicate::str::contains("--location"));
}

/// Unknown subcommands are rejected.
#[test]
fn test_invalid_command() {
    let mut cmd = Command::cargo_bin("ship").unwrap();
    cmd.arg("not-a-command").assert().failure();
}

/// `scaffold` writes the full file set into the working directory.
#[test]
fn test_scaffold_writes_files() {
    let dir = tempfile::tempdir().unwrap();

    let mut cmd = Command::cargo_bin("ship").unwrap();
    cmd.current_dir(dir.path())
        .arg("scaffold")
        .arg("app1")
        .assert()
        .success()
        .stdout(predicate::str::contains("Scaffold complete"));

    assert!(dir.path().join("app/main.py").exists());
    assert!(dir.path().join("app/__init__.py").exists());
    assert!(dir.path().join("wsgi.py").exists());
    assert!(dir.path().join("requirements.txt").exists());
    assert!(dir.path().join("startup.sh").exists());
    assert!(dir.path().join("web.config").exists());
    assert!(dir.path().join(".gitignore").exists());
    assert!(dir.path().join(".github/workflows/deploy.yml").exists());
}

/// Running scaffold twice leaves every file byte-identical.
#[test]
fn test_scaffold_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();

    let scaffold = |d: &std::path::Path| {
        Command::cargo_bin("ship")
            .unwrap()
            .current_dir(d)
            .arg("scaffold")
            .arg("app1")
            .assert()
            .success();
    };

    scaffold(dir.path());
    let first = std::fs::read(dir.path().join("web.config")).unwrap();
    let first_marker = std::fs::read(dir.path().join("app/__init__.py")).unwrap();

    scaffold(dir.path());
    let second = std::fs::read(dir.path().join("web.config")).unwrap();
    let second_marker = std::fs::read(dir.path().join("app/__init__.py")).unwrap();

    assert_eq!(first, second);
    assert_eq!(first_marker, second_marker);
}

/// An app name with invalid characters is rejected before anything is
/// written.
#[test]
fn test_scaffold_rejects_bad_name() {
    let dir = tempfile::tempdir().unwrap();

    Command::cargo_bin("ship")
        .unwrap()
        .current_dir(dir.path())
        .arg("scaffold")
        .arg("bad name!")
        .assert()
        .failure();

    assert!(!dir.path().join("app").exists());
}
