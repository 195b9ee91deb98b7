//! # rpideploy Setup Command
//!
//! File: cli/src/commands/setup.rs
//!
//! ## Overview
//!
//! `rpideploy setup` takes a fresh checkout to a deployed frontend:
//!
//! 1. Check that `node`, `npm`, `git` and `ssh` are installed.
//! 2. Install frontend dependencies.
//! 3. Discover the device. When nothing is found the fallback address is
//!    recorded instead, so the generated files always exist afterwards.
//! 4. Build the production bundle.
//! 5. Publish to GitHub Pages (a failure is a warning).
//! 6. Optionally copy the build to the device (asks first).
//! 7. Print the device URLs, the available commands and the generated files.
//!
//! ## Usage
//!
//! ```bash
//! rpideploy setup
//! rpideploy setup --yes --fallback-address 192.168.1.77
//! ```
//!
use crate::commands::deploy::{device, Pipeline, StepOutcome};
use crate::commands::discover;
use crate::common::deploy::{Builder, PackageScripts, Publisher, RemoteDeployer, SshDeployer};
use crate::common::network::{
    self,
    probe::{FingerprintProbe, LivenessProbe},
    Locator, API_PORT,
};
use crate::common::system;
use crate::common::ui;
use crate::core::config::{self, Config};
use crate::core::error::{DeployError, Result};
use crate::core::location::{self, ServiceLocation};
use clap::Parser;
use std::net::Ipv4Addr;
use tracing::warn;

/// Arguments for `rpideploy setup`.
#[derive(Parser, Debug)]
pub struct SetupArgs {
    /// Answer yes to every question.
    #[arg(short, long)]
    pub yes: bool,
    /// Address recorded when discovery finds nothing (overrides `device.fallback_address`).
    #[arg(long, value_name = "IP")]
    pub fallback_address: Option<Ipv4Addr>,
}

/// What a setup run did, for the closing summary.
#[derive(Debug, Clone, PartialEq)]
pub struct SetupSummary {
    pub location: ServiceLocation,
    pub discovered: bool,
    pub github: StepOutcome,
    pub device: StepOutcome,
}

/// Steps 2 to 6, after the prerequisite check.
pub async fn run_setup<B, P, R, L, F>(
    pipeline: &Pipeline<'_, B, P, R>,
    locator: &Locator<L, F>,
    cfg: &Config,
    fallback: Ipv4Addr,
) -> Result<SetupSummary>
where
    B: Builder,
    P: Publisher,
    R: RemoteDeployer,
    L: LivenessProbe,
    F: FingerprintProbe,
{
    ui::step("📦 Installing dependencies");
    pipeline.install().await?;

    ui::step("🔍 Discovering Raspberry Pi");
    let (location, discovered) =
        match discover::discover_and_record(locator, &cfg.artifacts, false).await? {
            Some(found) => {
                println!("✅ Raspberry Pi discovered and configured");
                (found, true)
            }
            None => {
                warn!("Discovery failed, recording fallback address {}", fallback);
                let manual = ServiceLocation::confirmed_now(fallback, API_PORT);
                location::record(&manual, &cfg.artifacts)?;
                println!("⚠️ Raspberry Pi discovery failed, continuing with {}", fallback);
                println!("📝 Update it later with: rpideploy configure --address <ip>");
                (manual, false)
            }
        };

    ui::step("🏗️ Building frontend");
    pipeline.build().await?;

    ui::step("🚀 Deploying to GitHub Pages");
    let github = pipeline.publish(false).await?;
    if github == StepOutcome::Failed {
        println!("⚠️ Check your repository settings; GitHub Pages deployment is optional");
    }

    ui::step("🤖 Deploying to Raspberry Pi");
    let device = pipeline.deploy_to_device(&location).await?;

    Ok(SetupSummary {
        location,
        discovered,
        github,
        device,
    })
}

pub async fn handle_setup(args: SetupArgs) -> Result<()> {
    let cfg = config::load_config()?;
    let fallback = match args.fallback_address {
        Some(address) => address,
        None => cfg.device.fallback_ip()?,
    };
    let project_dir = cfg.project_root.clone();

    ui::banner("🚀 rpideploy Quick Setup");
    println!("🔍 Checking prerequisites...");
    let report = system::check_tools(system::PREREQUISITES).await;
    if !report.all_present() {
        return Err(DeployError::Config(format!(
            "Missing prerequisites: {}",
            report.missing().join(", ")
        ))
        .into());
    }

    let prompter = ui::prompter(args.yes);
    let scripts = PackageScripts::new(&cfg.build, &project_dir);
    let pipeline = Pipeline::new(
        scripts.clone(),
        scripts,
        SshDeployer::new(&cfg.device.username),
        prompter.as_ref(),
        &cfg,
        &project_dir,
    );
    let locator = network::system_locator();

    let summary = run_setup(&pipeline, &locator, &cfg, fallback).await?;
    print_summary(&summary, &cfg);
    Ok(())
}

fn print_summary(summary: &SetupSummary, cfg: &Config) {
    let address = summary.location.address;
    println!();
    ui::banner("🎉 Setup Complete!");
    if summary.discovered {
        println!("🌐 Raspberry Pi IP: {}", address);
    } else {
        println!("🌐 Raspberry Pi IP: {} (fallback, not verified)", address);
    }
    println!("🔗 Backend API: {}", summary.location.base_url());
    println!(
        "🔗 RPi Web Interface: http://{}:{}",
        address,
        device::WEB_SERVER_PORT
    );
    match &cfg.build.pages_url {
        Some(url) => println!("📱 GitHub Pages: {}", url),
        None => println!("📱 GitHub Pages: check your repository settings for the URL"),
    }

    println!("\n📋 Available Commands:");
    println!("  rpideploy discover    - Rediscover the Raspberry Pi");
    println!("  rpideploy configure   - Set the Raspberry Pi address manually");
    println!("  rpideploy check       - Test the Raspberry Pi API endpoints");
    println!("  rpideploy deploy      - Deploy to GitHub Pages and the Raspberry Pi");
    println!(
        "  {} run {:<13} - Build for production",
        cfg.build.package_manager, cfg.build.build_script
    );

    println!("\n🔧 Configuration Files:");
    println!("  {:<20} - Development environment", cfg.artifacts.env_file);
    println!(
        "  {:<20} - Production environment",
        cfg.artifacts.production_env_file
    );
    println!("  {:<20} - GitHub Pages workflow", cfg.artifacts.workflow_file);
    println!(
        "  {:<20} - Raspberry Pi discovery results",
        cfg.artifacts.location_file
    );
}
