//! # rpideploy Main Entry Point
//!
//! File: cli/src/main.rs
//!
//! ## Overview
//!
//! Entry point for the rpideploy CLI. It handles:
//! - Command-line argument parsing using Clap
//! - Setting up the logging system based on verbosity flags
//! - Routing execution to the command handlers
//!
//! ## Architecture
//!
//! - Each top-level command (`discover`, `deploy`, ...) is a variant of `Commands`
//! - Variants map to `handle_*` functions in `commands::`
//! - All errors are propagated to this level, printed once, and turned into exit code 1
//!
//! ## Examples
//!
//! ```bash
//! # Find the Raspberry Pi and regenerate .env files
//! rpideploy discover
//!
//! # Build and deploy everywhere without prompts, with debug logging
//! rpideploy -vv deploy --yes
//! ```
//!
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

mod commands; // Command handlers (discover, deploy, setup, check)
mod common; // Shared utilities (network, process, ui, ...)
mod core; // Core infrastructure (errors, config, location, templating)

/// Top-level command-line arguments.
#[derive(Parser, Debug)]
#[command(
    name = "rpideploy",
    about = "📡 rpideploy: find the Raspberry Pi autonomy system and deploy its frontend",
    long_about = "Discovers the Raspberry Pi running the autonomy system API on the local network,\n\
                  keeps the frontend's environment files pointed at it, and builds and deploys\n\
                  the frontend to GitHub Pages and to the device.",
    propagate_version = true,
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Parser, Debug)]
enum Commands {
    /// Find the device and regenerate the environment files
    #[command(alias = "d")]
    Discover(commands::discover::DiscoverArgs),
    /// Record a known device address without scanning
    Configure(commands::discover::ConfigureArgs),
    /// Build and deploy the frontend to GitHub Pages and the device
    Deploy(commands::deploy::DeployArgs),
    /// Check prerequisites, discover, build and deploy in one go
    Setup(commands::setup::SetupArgs),
    /// Report which device API endpoints respond
    Check(commands::check::CheckArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    tracing::debug!("Parsed CLI arguments: {:?}", cli);

    let command_result = match cli.command {
        Commands::Discover(args) => commands::discover::handle_discover(args).await,
        Commands::Configure(args) => commands::discover::handle_configure(args).await,
        Commands::Deploy(args) => commands::deploy::handle_deploy(args).await,
        Commands::Setup(args) => commands::setup::handle_setup(args).await,
        Commands::Check(args) => commands::check::handle_check(args).await,
    };

    if let Err(e) = command_result {
        tracing::error!("Command execution failed: {:?}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}
