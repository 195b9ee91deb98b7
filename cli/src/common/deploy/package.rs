//! # Package Manager Scripts (`common::deploy::package`)
//!
//! File: cli/src/common/deploy/package.rs
//!
//! `Builder` and `Publisher` backed by the frontend's package manager:
//! `npm install`, `npm run <build_script>` and `npm run <publish_script>`
//! by default, all run in the project directory with output streamed.
//!
use super::{Builder, Publisher};
use crate::common::process;
use crate::core::config::BuildConfig;
use crate::core::error::Result;
use anyhow::Context;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct PackageScripts {
    program: String,
    build_script: String,
    publish_script: String,
    project_dir: PathBuf,
}

impl PackageScripts {
    pub fn new(build: &BuildConfig, project_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: build.package_manager.clone(),
            build_script: build.build_script.clone(),
            publish_script: build.publish_script.clone(),
            project_dir: project_dir.into(),
        }
    }

    async fn run(&self, args: &[&str]) -> Result<()> {
        println!("🔄 {}...", process::display_command(&self.program, args));
        process::run_streamed(&self.program, args, Some(&self.project_dir)).await
    }
}

impl Builder for PackageScripts {
    async fn install(&self) -> Result<()> {
        self.run(&["install"])
            .await
            .context("Installing dependencies failed")
    }

    async fn build(&self) -> Result<()> {
        self.run(&["run", &self.build_script])
            .await
            .context("Building the production frontend failed")
    }
}

impl Publisher for PackageScripts {
    async fn publish(&self) -> Result<()> {
        self.run(&["run", &self.publish_script])
            .await
            .context("Publishing to GitHub Pages failed")
    }
}
