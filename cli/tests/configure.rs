//! # rpideploy Configure Integration Tests
//!
//! File: cli/tests/configure.rs
//!
//! `rpideploy configure` records a location without probing, so it exercises
//! the full persist-then-regenerate path of the binary without a network.
//!

mod common;
use common::*;
use predicates::prelude::*;
use serde_json::Value;

#[test]
fn test_configure_writes_record_and_artifacts() {
    let project = isolated_project();
    rpideploy_in(project.path())
        .args(["configure", "--address", "10.0.0.42"])
        .assert()
        .success()
        .stdout(predicate::str::contains("http://10.0.0.42:5000"));

    let record: Value = serde_json::from_str(&read(project.path().join("rpi_config.json"))).unwrap();
    assert_eq!(record["address"], "10.0.0.42");
    assert_eq!(record["port"], 5000);
    assert_eq!(record["base_url"], "http://10.0.0.42:5000");
    assert_eq!(record["stream_url"], "http://10.0.0.42:5000/video_feed");

    let env = read(project.path().join(".env"));
    assert!(env.starts_with('#'));
    assert!(env.contains("VITE_API_BASE_URL=http://10.0.0.42:5000\n"));
    assert!(env.contains("VITE_ENVIRONMENT=development\n"));

    let production = read(project.path().join(".env.production"));
    assert!(production.contains("VITE_API_BASE_URL=http://10.0.0.42:5000\n"));
    assert!(production.contains("VITE_ENVIRONMENT=production\n"));

    let workflow = read(project.path().join(".github/workflows/deploy.yml"));
    assert!(workflow.contains("http://10.0.0.42:5000/video_feed"));
    assert!(workflow.contains("${{ secrets.GITHUB_TOKEN }}"));
}

#[test]
fn test_configure_twice_is_idempotent() {
    let project = isolated_project();
    let run = || {
        rpideploy_in(project.path())
            .args(["configure", "--address", "192.168.4.7", "--port", "5001"])
            .assert()
            .success();
    };

    run();
    let env = read(project.path().join(".env"));
    let workflow = read(project.path().join(".github/workflows/deploy.yml"));
    run();

    assert!(env.contains("VITE_API_BASE_URL=http://192.168.4.7:5001\n"));
    assert_eq!(read(project.path().join(".env")), env);
    assert_eq!(
        read(project.path().join(".github/workflows/deploy.yml")),
        workflow
    );
}

#[test]
fn test_project_config_redirects_artifacts() {
    let project = isolated_project();
    std::fs::write(
        project.path().join(".rpideploy.toml"),
        "[artifacts]\nenv_file = \"frontend/.env.local\"\nupdate_interval_ms = 500\n",
    )
    .unwrap();

    rpideploy_in(project.path())
        .args(["configure", "--address", "10.0.0.42"])
        .assert()
        .success();

    let env = read(project.path().join("frontend/.env.local"));
    assert!(env.contains("VITE_UPDATE_INTERVAL=500\n"));
    assert!(!project.path().join(".env").exists());
}

#[test]
fn test_configure_from_subdirectory_writes_at_project_root() {
    let project = isolated_project();
    let nested = project.path().join("src/components");
    std::fs::create_dir_all(&nested).unwrap();

    rpideploy_in(&nested)
        .args(["configure", "--address", "10.0.0.42"])
        .assert()
        .success();

    assert!(read(project.path().join(".env")).contains("VITE_API_BASE_URL=http://10.0.0.42:5000\n"));
    assert!(project.path().join("rpi_config.json").is_file());
    assert!(project.path().join(".github/workflows/deploy.yml").is_file());
    assert!(!nested.join(".env").exists());
    assert!(!nested.join("rpi_config.json").exists());
}

#[test]
fn test_invalid_project_config_fails() {
    let project = isolated_project();
    std::fs::write(
        project.path().join(".rpideploy.toml"),
        "[artifacts]\nupdate_interval_ms = 0\n",
    )
    .unwrap();

    rpideploy_in(project.path())
        .args(["configure", "--address", "10.0.0.42"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
    assert!(!project.path().join("rpi_config.json").exists());
}

#[test]
fn test_configure_rejects_bad_address() {
    let project = isolated_project();
    rpideploy_in(project.path())
        .args(["configure", "--address", "10.0.0.300"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_deploy_without_record_fails_fast() {
    let project = isolated_project();
    rpideploy_in(project.path())
        .args(["deploy", "--yes", "--skip-discovery"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No recorded location"));
}
