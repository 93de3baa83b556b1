//! End-to-end runs of the synclone binary that need no network

mod common;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

use common::test_fixtures::SAMPLE_YAML;

fn synclone() -> Command {
    let mut cmd = Command::cargo_bin("synclone").unwrap();
    cmd.env_remove("SYNCLONE_CONFIG").env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_init_then_validate() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("conf").join("synclone.yaml");

    synclone()
        .args(["--no-color", "init", "--path"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Created"));
    assert!(path.is_file());

    synclone()
        .args(["--no-color", "init", "--path"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    synclone()
        .args(["--no-color", "validate-config", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("is valid"))
        .stdout(predicate::str::contains("2 organizations"));
}

#[test]
fn test_validate_rejects_bad_visibility() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("synclone.yaml");
    std::fs::write(&path, SAMPLE_YAML.replace("visibility: private", "visibility: secret")).unwrap();

    synclone()
        .args(["--no-color", "validate-config", "--config"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("secret"));
}

#[test]
fn test_token_check_fails_without_token() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("synclone.yaml");
    std::fs::write(
        &path,
        "version: \"1.0.0\"\nproviders:\n  github:\n    organizations:\n      - name: acme\n",
    )
    .unwrap();

    synclone()
        .args(["--no-color", "validate-config", "--check-tokens", "--config"])
        .arg(&path)
        .assert()
        .failure()
        .stdout(predicate::str::contains("is valid"))
        .stdout(predicate::str::contains("no GitHub token configured"))
        .stderr(predicate::str::contains("Token check failed for: github"));
}

#[test]
fn test_missing_config_file() {
    let temp = TempDir::new().unwrap();
    synclone()
        .args(["--no-color", "clone", "--config"])
        .arg(temp.path().join("absent.yaml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_clone_with_no_organizations_outputs_json() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("synclone.yaml");
    std::fs::write(
        &path,
        format!(
            "version: \"1.0.0\"\nglobal:\n  clone_base_dir: {}\nproviders:\n  github: {{}}\n",
            temp.path().display()
        ),
    )
    .unwrap();

    synclone()
        .args(["--no-color", "clone", "--dry-run", "--output", "json", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"total_targets\": 0"))
        .stdout(predicate::str::contains("\"dry_run\": true"));
}

#[test]
fn test_unknown_provider_selection_fails() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("synclone.yaml");
    std::fs::write(&path, SAMPLE_YAML).unwrap();

    synclone()
        .args(["--no-color", "refresh", "--provider", "gitea", "--config"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("No configured provider"));
}

#[test]
fn test_list_rejects_unknown_provider() {
    synclone()
        .args(["list", "--provider", "bitbucket", "--org", "acme"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported provider"));
}

#[test]
fn test_clone_header_counts_selected_organizations() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("synclone.yaml");
    std::fs::write(&path, SAMPLE_YAML).unwrap();

    synclone()
        .args(["--no-color", "clone", "--dry-run", "--org", "someone-else", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Cloning 0 organizations"));
}
