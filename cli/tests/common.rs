//! # rpideploy CLI Integration Test Common Helpers
//!
//! File: cli/tests/common.rs
//!
//! ## Overview
//!
//! Shared helpers for the integration tests in `cli/tests/`. Each test file
//! is compiled as its own crate and pulls this in with `mod common;`.
//!
//! Commands that load configuration run inside an isolated project: a
//! temporary directory with a `.git` marker (so the project config search
//! stops there) and `HOME` / `XDG_CONFIG_HOME` pointing inside it (so no
//! real user config is read).
//!

// Different test files use different helpers.
#![allow(dead_code)]

pub use assert_cmd::Command;
use std::path::Path;
use tempfile::TempDir;

/// `rpideploy` binary built for this test run.
pub fn rpideploy_cmd() -> Command {
    Command::cargo_bin("rpideploy").expect("Failed to find rpideploy binary for testing")
}

/// Empty project directory isolated from the host configuration.
pub fn isolated_project() -> TempDir {
    let dir = tempfile::tempdir().expect("Failed to create temp project dir");
    std::fs::create_dir(dir.path().join(".git")).expect("Failed to create .git marker");
    dir
}

/// `rpideploy` running inside `project` with isolated config directories.
pub fn rpideploy_in(project: &Path) -> Command {
    let mut cmd = rpideploy_cmd();
    cmd.current_dir(project)
        .env("HOME", project.join("home"))
        .env("XDG_CONFIG_HOME", project.join("home/.config"))
        .env_remove("RUST_LOG");
    cmd
}

pub fn read(path: impl AsRef<Path>) -> String {
    std::fs::read_to_string(path.as_ref())
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", path.as_ref().display(), e))
}
