//! # rpideploy Process Execution Utilities (`common::process`)
//!
//! File: cli/src/common/process.rs
//!
//! ## Overview
//!
//! Thin wrappers around `tokio::process::Command` for the external tools the
//! deployment steps drive (`npm`, `ssh`, `scp`, `git`, `node`).
//!
//! - `run_streamed`: output goes straight to the user's terminal. Used for
//!   long-running steps such as installs and builds.
//! - `run_capture`: stdout is captured and returned. Used for short queries
//!   such as `--version`.
//!
//! A non-zero exit becomes `DeployError::ExternalCommand`; a program that
//! cannot be spawned at all becomes an error with context naming it.
//!
use crate::core::error::{DeployError, Result};
use anyhow::Context;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Renders `program args...` for messages.
pub fn display_command(program: &str, args: &[&str]) -> String {
    std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}

fn command(program: &str, args: &[&str], cwd: Option<&Path>) -> Command {
    let mut cmd = Command::new(program);
    cmd.args(args).stdin(Stdio::inherit());
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }
    cmd
}

/// Runs a command with inherited stdout/stderr and waits for it.
pub async fn run_streamed(program: &str, args: &[&str], cwd: Option<&Path>) -> Result<()> {
    let shown = display_command(program, args);
    debug!("Running: {}", shown);
    let status = command(program, args, cwd)
        .status()
        .await
        .with_context(|| format!("Failed to start '{}'", program))?;

    if !status.success() {
        return Err(DeployError::ExternalCommand {
            cmd: shown,
            status: status.to_string(),
            output: "(streamed to terminal)".to_string(),
        }
        .into());
    }
    Ok(())
}

/// Runs a command and returns its trimmed stdout.
pub async fn run_capture(program: &str, args: &[&str]) -> Result<String> {
    let shown = display_command(program, args);
    debug!("Running (captured): {}", shown);
    let output = command(program, args, None)
        .stdin(Stdio::null())
        .output()
        .await
        .with_context(|| format!("Failed to start '{}'", program))?;

    if !output.status.success() {
        return Err(DeployError::ExternalCommand {
            cmd: shown,
            status: output.status.to_string(),
            output: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
        .into());
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}
