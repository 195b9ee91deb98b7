//! # Deployment Collaborators (`common::deploy`)
//!
//! File: cli/src/common/deploy/mod.rs
//!
//! ## Overview
//!
//! The external steps of a deployment, each behind a trait so the command
//! pipelines can run against fakes:
//!
//! - **`Builder`**: install frontend dependencies and build the production bundle.
//! - **`Publisher`**: publish the bundle to GitHub Pages.
//! - **`RemoteDeployer`**: run commands on, and copy files to, the device.
//!
//! The process-backed implementations live in `package` (`npm` scripts) and
//! `remote` (`ssh` / `scp`).
//!
use crate::core::error::Result;
use std::future::Future;
use std::net::Ipv4Addr;
use std::path::PathBuf;

pub mod package;
pub mod remote;

pub use package::PackageScripts;
pub use remote::SshDeployer;

/// Installs dependencies and builds the frontend.
pub trait Builder {
    fn install(&self) -> impl Future<Output = Result<()>>;
    fn build(&self) -> impl Future<Output = Result<()>>;
}

/// Publishes the built frontend.
pub trait Publisher {
    fn publish(&self) -> impl Future<Output = Result<()>>;
}

/// Remote shell access to the device.
pub trait RemoteDeployer {
    /// Runs `command` in the device's login shell.
    fn run(&self, host: Ipv4Addr, command: &str) -> impl Future<Output = Result<()>>;

    /// Copies local `sources` into `destination` on the device, recursively.
    fn copy(
        &self,
        host: Ipv4Addr,
        sources: &[PathBuf],
        destination: &str,
    ) -> impl Future<Output = Result<()>>;
}
