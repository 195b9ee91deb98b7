//! # rpideploy Discover and Configure Commands
//!
//! File: cli/src/commands/discover.rs
//!
//! ## Overview
//!
//! - `rpideploy discover`: find the device, persist its location and
//!   regenerate the environment and workflow files.
//! - `rpideploy configure --address <ip>`: record a known address without
//!   probing.
//!
//! Both go through `location::record`, so the generated files always match
//! the persisted location.
//!
//! ## Usage
//!
//! ```bash
//! # Reuse the cached address when it still answers, otherwise scan
//! rpideploy discover
//!
//! # Ignore the cache and scan a specific /24
//! rpideploy discover --rescan --subnet 10.0.0
//!
//! # Point the frontend at a known device
//! rpideploy configure --address 192.168.1.50
//! ```
//!
use crate::common::network::{
    self,
    probe::{FingerprintProbe, LivenessProbe},
    Discovery, Locator, Subnet, API_PORT,
};
use crate::core::config::{self, ArtifactsConfig};
use crate::core::error::{DeployError, Result};
use crate::core::location::{self, LocationStore, ServiceLocation};
use clap::Parser;
use std::net::Ipv4Addr;
use tracing::{info, warn};

/// Arguments for `rpideploy discover`.
#[derive(Parser, Debug)]
pub struct DiscoverArgs {
    /// Skip the cached-address check and always scan.
    #[arg(long)]
    pub rescan: bool,
    /// Scan this /24 (e.g. `10.0.0`) instead of the local one.
    #[arg(long, value_name = "PREFIX")]
    pub subnet: Option<Subnet>,
    /// API port to scan for. A cached location is checked on its recorded port.
    #[arg(long, default_value_t = API_PORT)]
    pub port: u16,
}

/// Arguments for `rpideploy configure`.
#[derive(Parser, Debug)]
pub struct ConfigureArgs {
    /// Device IPv4 address.
    #[arg(long, value_name = "IP")]
    pub address: Ipv4Addr,
    /// API port on the device.
    #[arg(long, default_value_t = API_PORT)]
    pub port: u16,
}

pub async fn handle_discover(args: DiscoverArgs) -> Result<()> {
    let cfg = config::load_config()?;
    let mut locator = network::system_locator().with_port(args.port);
    if let Some(subnet) = args.subnet {
        locator = locator.with_subnet(subnet);
    }

    println!("🔍 Discovering Raspberry Pi with the autonomy system...");
    match discover_and_record(&locator, &cfg.artifacts, args.rescan).await? {
        Some(found) => {
            print_location(&found, &cfg.artifacts);
            Ok(())
        }
        None => {
            println!("❌ Raspberry Pi not found");
            println!("💡 Make sure the Raspberry Pi is powered on, on this network, and running the autonomy API");
            println!("💡 Or set the address manually: rpideploy configure --address <ip>");
            Err(DeployError::DiscoveryFailed.into())
        }
    }
}

pub async fn handle_configure(args: ConfigureArgs) -> Result<()> {
    let cfg = config::load_config()?;
    let found = ServiceLocation::confirmed_now(args.address, args.port);
    location::record(&found, &cfg.artifacts)?;
    println!("✅ Configured device at {}", found.base_url());
    print_location(&found, &cfg.artifacts);
    Ok(())
}

/// Loads the cached location, treating a malformed record as absent.
pub fn load_cached(artifacts: &ArtifactsConfig) -> Option<ServiceLocation> {
    let store = LocationStore::new(&artifacts.location_file);
    match store.load() {
        Ok(cached) => cached,
        Err(e) => {
            warn!("Ignoring cached location: {:#}", e);
            None
        }
    }
}

/// Runs discovery and records the result on the port it was confirmed on.
/// `None` when nothing was found; the persisted location is left untouched
/// in that case.
pub async fn discover_and_record<L, F>(
    locator: &Locator<L, F>,
    artifacts: &ArtifactsConfig,
    rescan: bool,
) -> Result<Option<ServiceLocation>>
where
    L: LivenessProbe,
    F: FingerprintProbe,
{
    let cached = if rescan { None } else { load_cached(artifacts) };
    let discovery = locator.locate(cached.as_ref()).await;
    match discovery {
        Discovery::Found { address, port, via } => {
            info!("Found {}:{} via {}", address, port, via);
            let found = ServiceLocation::confirmed_now(address, port);
            location::record(&found, artifacts)?;
            Ok(Some(found))
        }
        Discovery::NotFound => Ok(None),
    }
}

pub fn print_location(found: &ServiceLocation, artifacts: &ArtifactsConfig) {
    println!("🔗 Backend API: {}", found.base_url());
    println!("📹 Video Stream: {}", found.stream_url());
    println!(
        "📝 Updated {}, {}, {} and {}",
        artifacts.location_file,
        artifacts.env_file,
        artifacts.production_env_file,
        artifacts.workflow_file
    );
}
