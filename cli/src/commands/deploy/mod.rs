//! # rpideploy Deploy Command
//!
//! File: cli/src/commands/deploy/mod.rs
//!
//! ## Overview
//!
//! `rpideploy deploy` runs the whole release in order:
//!
//! 1. Discover the device (or reuse the recorded location with `--skip-discovery`).
//! 2. Install frontend dependencies.
//! 3. Build the production bundle.
//! 4. Publish to GitHub Pages (asks first, `--skip-github` to skip).
//! 5. Copy the bundle to the device and install its web server (asks first,
//!    `--skip-rpi` to skip).
//! 6. Print a summary.
//!
//! Install and build failures abort the run. Publishing and device
//! deployment failures are reported as warnings and the run continues. The
//! recorded location is never rolled back.
//!
//! ## Architecture
//!
//! The steps live on `Pipeline`, generic over the `Builder`, `Publisher` and
//! `RemoteDeployer` collaborators. `handle_deploy` wires in the process-backed
//! implementations; `setup` reuses the same pipeline.
//!
//! ## Usage
//!
//! ```bash
//! rpideploy deploy
//! rpideploy deploy --yes --skip-github
//! ```
//!
use crate::commands::discover;
use crate::common::deploy::{Builder, PackageScripts, Publisher, RemoteDeployer, SshDeployer};
use crate::common::network;
use crate::common::ui::{self, Prompter};
use crate::core::config::{self, Config};
use crate::core::error::{DeployError, Result};
use crate::core::location::ServiceLocation;
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::warn;

pub mod device;

/// Arguments for `rpideploy deploy`.
#[derive(Parser, Debug, Default)]
pub struct DeployArgs {
    /// Answer yes to every question.
    #[arg(short, long)]
    pub yes: bool,
    /// Reuse the recorded location instead of discovering.
    #[arg(long)]
    pub skip_discovery: bool,
    /// Do not publish to GitHub Pages.
    #[arg(long)]
    pub skip_github: bool,
    /// Do not copy the build to the Raspberry Pi.
    #[arg(long)]
    pub skip_rpi: bool,
}

/// How an optional step ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Done,
    Skipped,
    Failed,
}

/// What a deploy run did, for the closing summary.
#[derive(Debug, Clone, PartialEq)]
pub struct DeploySummary {
    pub location: ServiceLocation,
    pub github: StepOutcome,
    pub device: StepOutcome,
}

/// Deployment steps over a set of collaborators.
pub struct Pipeline<'a, B, P, R> {
    builder: B,
    publisher: P,
    remote: R,
    prompter: &'a dyn Prompter,
    config: &'a Config,
    project_dir: PathBuf,
}

impl<'a, B: Builder, P: Publisher, R: RemoteDeployer> Pipeline<'a, B, P, R> {
    pub fn new(
        builder: B,
        publisher: P,
        remote: R,
        prompter: &'a dyn Prompter,
        config: &'a Config,
        project_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            builder,
            publisher,
            remote,
            prompter,
            config,
            project_dir: project_dir.into(),
        }
    }

    pub async fn install(&self) -> Result<()> {
        self.builder.install().await?;
        println!("✅ Dependencies installed");
        Ok(())
    }

    pub async fn build(&self) -> Result<()> {
        self.builder.build().await?;
        println!("✅ Frontend built");
        Ok(())
    }

    /// Publishes to GitHub Pages, asking first when `ask` is set.
    pub async fn publish(&self, ask: bool) -> Result<StepOutcome> {
        if ask {
            println!("💡 Publishing needs a GitHub repository with the code pushed and Pages enabled.");
            if !self.prompter.confirm("Deploy to GitHub Pages?")? {
                return Ok(StepOutcome::Skipped);
            }
        }
        match self.publisher.publish().await {
            Ok(()) => {
                println!("✅ GitHub Pages deployment initiated");
                Ok(StepOutcome::Done)
            }
            Err(e) => {
                warn!("GitHub Pages deployment failed: {:#}", e);
                println!("⚠️ GitHub Pages deployment failed (you can retry manually later)");
                Ok(StepOutcome::Failed)
            }
        }
    }

    /// Copies the build to the device and installs its web server.
    pub async fn deploy_to_device(&self, location: &ServiceLocation) -> Result<StepOutcome> {
        let question = format!("Deploy frontend to Raspberry Pi ({})?", location.address);
        if !self.prompter.confirm(&question)? {
            return Ok(StepOutcome::Skipped);
        }
        match self.copy_to_device(location).await {
            Ok(()) => Ok(StepOutcome::Done),
            Err(e) => {
                warn!("Raspberry Pi deployment failed: {:#}", e);
                println!("⚠️ Raspberry Pi deployment failed: {}", e);
                Ok(StepOutcome::Failed)
            }
        }
    }

    async fn copy_to_device(&self, location: &ServiceLocation) -> Result<()> {
        let device = &self.config.device;
        let dist = self.project_dir.join(&self.config.build.dist_dir);
        device::deploy_frontend(&self.remote, location.address, device, &dist).await?;
        device::install_web_server(&self.remote, location.address, device).await
    }

    /// Steps 2 to 5 for an already known location.
    pub async fn run(&self, location: ServiceLocation, args: &DeployArgs) -> Result<DeploySummary> {
        ui::step("📦 STEP 2: INSTALLING DEPENDENCIES");
        self.install().await?;

        ui::step("🔨 STEP 3: BUILDING FRONTEND");
        self.build().await?;

        ui::step("🌐 STEP 4: GITHUB PAGES DEPLOYMENT");
        let github = if args.skip_github {
            println!("⏭️ Skipped (--skip-github)");
            StepOutcome::Skipped
        } else {
            self.publish(true).await?
        };

        ui::step("📡 STEP 5: RASPBERRY PI DEPLOYMENT");
        let device = if args.skip_rpi {
            println!("⏭️ Skipped (--skip-rpi)");
            StepOutcome::Skipped
        } else {
            self.deploy_to_device(&location).await?
        };

        Ok(DeploySummary {
            location,
            github,
            device,
        })
    }
}

pub async fn handle_deploy(args: DeployArgs) -> Result<()> {
    let cfg = config::load_config()?;
    let project_dir = cfg.project_root.clone();

    ui::banner("🚀 COMPLETE AUTONOMOUS SYSTEM DEPLOYMENT");
    ui::step("📡 STEP 1: DISCOVERING RASPBERRY PI");
    let location = if args.skip_discovery {
        let cached = discover::load_cached(&cfg.artifacts).ok_or_else(|| {
            DeployError::Config(format!(
                "No recorded location in {}. Run 'rpideploy discover' first.",
                cfg.artifacts.location_file
            ))
        })?;
        println!("✅ Using recorded address: {}", cached.address);
        cached
    } else {
        let locator = network::system_locator();
        match discover::discover_and_record(&locator, &cfg.artifacts, false).await? {
            Some(found) => found,
            None => {
                println!("❌ Cannot proceed without the Raspberry Pi");
                println!("💡 Make sure it is running the autonomy system API");
                return Err(DeployError::DiscoveryFailed.into());
            }
        }
    };
    discover::print_location(&location, &cfg.artifacts);

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
    let summary = pipeline.run(location, &args).await?;
    print_summary(&summary, &cfg);
    Ok(())
}

fn print_summary(summary: &DeploySummary, cfg: &Config) {
    let location = &summary.location;
    println!();
    ui::banner("🎉 DEPLOYMENT COMPLETE!");
    println!("✅ Raspberry Pi IP: {}", location.address);
    println!("🔗 Backend API: {}", location.base_url());
    println!("📹 Video Stream: {}", location.stream_url());

    if summary.github == StepOutcome::Done {
        match &cfg.build.pages_url {
            Some(url) => println!("🌐 GitHub Pages: {}", url),
            None => println!("🌐 GitHub Pages: check your repository settings for the URL"),
        }
    }
    if summary.device == StepOutcome::Done {
        println!(
            "🏠 RPi Frontend: http://{}:{}",
            location.address,
            device::WEB_SERVER_PORT
        );
        println!(
            "💡 Start the RPi web server: ssh {}@{} 'cd {} && python3 web_server.py'",
            cfg.device.username, location.address, cfg.device.remote_root
        );
    }

    println!(
        "\n📋 Configuration saved to {}",
        Path::new(&cfg.artifacts.location_file).display()
    );
    println!("🔄 Re-run 'rpideploy deploy' anytime to rediscover and redeploy");
}

#[cfg(test)]
pub(crate) mod tests {
    use super::device::tests::{sample_dist, FakeRemote};
    use super::*;
    use crate::common::ui::tests::ScriptedPrompter;
    use std::cell::RefCell;
    use std::net::Ipv4Addr;

    /// Records build steps; fails the named one.
    #[derive(Default)]
    pub(crate) struct FakeTools {
        pub calls: RefCell<Vec<&'static str>>,
        pub fail: Option<&'static str>,
    }

    impl FakeTools {
        pub fn failing(step: &'static str) -> Self {
            Self {
                fail: Some(step),
                ..Self::default()
            }
        }

        fn step(&self, name: &'static str) -> Result<()> {
            self.calls.borrow_mut().push(name);
            if self.fail == Some(name) {
                anyhow::bail!("{} failed", name);
            }
            Ok(())
        }
    }

    impl Builder for &FakeTools {
        async fn install(&self) -> Result<()> {
            self.step("install")
        }
        async fn build(&self) -> Result<()> {
            self.step("build")
        }
    }

    impl Publisher for &FakeTools {
        async fn publish(&self) -> Result<()> {
            self.step("publish")
        }
    }

    impl RemoteDeployer for &FakeRemote {
        async fn run(&self, host: Ipv4Addr, command: &str) -> Result<()> {
            (**self).run(host, command).await
        }
        async fn copy(&self, host: Ipv4Addr, sources: &[PathBuf], destination: &str) -> Result<()> {
            (**self).copy(host, sources, destination).await
        }
    }

    fn location() -> ServiceLocation {
        ServiceLocation::confirmed_now(Ipv4Addr::new(10, 0, 0, 42), 5000)
    }

    #[tokio::test]
    async fn test_full_run_with_all_steps() {
        let dir = tempfile::tempdir().unwrap();
        sample_dist(dir.path());
        let (tools, remote) = (FakeTools::default(), FakeRemote::default());
        let prompter = ScriptedPrompter::answering(&[true, true]);
        let cfg = Config::default();
        let pipeline = Pipeline::new(&tools, &tools, &remote, &prompter, &cfg, dir.path());

        let summary = pipeline.run(location(), &DeployArgs::default()).await.unwrap();

        assert_eq!(summary.github, StepOutcome::Done);
        assert_eq!(summary.device, StepOutcome::Done);
        assert_eq!(*tools.calls.borrow(), vec!["install", "build", "publish"]);
        assert_eq!(prompter.asked.borrow().len(), 2);
        assert_eq!(remote.ops.borrow().len(), 5);
    }

    #[tokio::test]
    async fn test_build_failure_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let tools = FakeTools::failing("build");
        let remote = FakeRemote::default();
        let prompter = ScriptedPrompter::answering(&[true, true]);
        let cfg = Config::default();
        let pipeline = Pipeline::new(&tools, &tools, &remote, &prompter, &cfg, dir.path());

        assert!(pipeline.run(location(), &DeployArgs::default()).await.is_err());
        assert_eq!(*tools.calls.borrow(), vec!["install", "build"]);
        assert!(prompter.asked.borrow().is_empty());
        assert!(remote.ops.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_publish_failure_continues_to_device() {
        let dir = tempfile::tempdir().unwrap();
        sample_dist(dir.path());
        let tools = FakeTools::failing("publish");
        let remote = FakeRemote::default();
        let prompter = ScriptedPrompter::answering(&[true, true]);
        let cfg = Config::default();
        let pipeline = Pipeline::new(&tools, &tools, &remote, &prompter, &cfg, dir.path());

        let summary = pipeline.run(location(), &DeployArgs::default()).await.unwrap();

        assert_eq!(summary.github, StepOutcome::Failed);
        assert_eq!(summary.device, StepOutcome::Done);
    }

    #[tokio::test]
    async fn test_device_failure_is_a_warning() {
        let dir = tempfile::tempdir().unwrap();
        sample_dist(dir.path());
        let tools = FakeTools::default();
        let remote = FakeRemote::failing_on("mkdir");
        let prompter = ScriptedPrompter::answering(&[false, true]);
        let cfg = Config::default();
        let pipeline = Pipeline::new(&tools, &tools, &remote, &prompter, &cfg, dir.path());

        let summary = pipeline.run(location(), &DeployArgs::default()).await.unwrap();

        assert_eq!(summary.github, StepOutcome::Skipped);
        assert_eq!(summary.device, StepOutcome::Failed);
        assert_eq!(*tools.calls.borrow(), vec!["install", "build"]);
        assert_eq!(remote.ops.borrow().len(), 1);
    }

    #[tokio::test]
    async fn test_skip_flags_never_prompt() {
        let dir = tempfile::tempdir().unwrap();
        let (tools, remote) = (FakeTools::default(), FakeRemote::default());
        let prompter = ScriptedPrompter::default();
        let cfg = Config::default();
        let pipeline = Pipeline::new(&tools, &tools, &remote, &prompter, &cfg, dir.path());
        let args = DeployArgs {
            skip_github: true,
            skip_rpi: true,
            ..DeployArgs::default()
        };

        let summary = pipeline.run(location(), &args).await.unwrap();

        assert_eq!(summary.github, StepOutcome::Skipped);
        assert_eq!(summary.device, StepOutcome::Skipped);
        assert!(prompter.asked.borrow().is_empty());
        assert!(remote.ops.borrow().is_empty());
    }

    #[test]
    fn test_args_parsing() {
        let args = DeployArgs::try_parse_from(["deploy", "-y", "--skip-discovery", "--skip-rpi"])
            .unwrap();
        assert!(args.yes && args.skip_discovery && args.skip_rpi);
        assert!(!args.skip_github);
    }
}
