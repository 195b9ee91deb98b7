//! # Device Deployment
//!
//! File: cli/src/commands/deploy/device.rs
//!
//! Copies the built frontend to the device and installs a small static file
//! server next to it:
//!
//! ```text
//! <remote_root>/
//! ├── web/dist/        # contents of the local dist directory
//! └── web_server.py    # serves web/dist on port 8080
//! ```
//!
use crate::common::deploy::RemoteDeployer;
use crate::common::fs::io;
use crate::core::config::DeviceConfig;
use crate::core::error::{DeployError, Result};
use crate::core::templating;
use anyhow::Context;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Port the installed web server listens on.
pub const WEB_SERVER_PORT: u16 = 8080;

pub fn remote_dist_dir(device: &DeviceConfig) -> String {
    format!("{}/web/dist", device.remote_root.trim_end_matches('/'))
}

pub fn remote_script_path(device: &DeviceConfig) -> String {
    format!("{}/web_server.py", device.remote_root.trim_end_matches('/'))
}

/// Single-quotes `path` for the remote shell. A leading `~/` stays outside
/// the quotes so the remote shell still expands it.
fn shell_quote(path: &str) -> String {
    let (home, rest) = match path.strip_prefix("~/") {
        Some(rest) => ("~/", rest),
        None => ("", path),
    };
    format!("{}'{}'", home, rest.replace('\'', r"'\''"))
}

/// Top-level entries of the local build output, sorted.
fn dist_entries(dist_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = std::fs::read_dir(dist_dir)
        .with_context(|| format!("Build output not found at {}", dist_dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()
        .with_context(|| format!("Failed to list {}", dist_dir.display()))?;
    if entries.is_empty() {
        return Err(DeployError::FileSystem(format!(
            "Build output {} is empty",
            dist_dir.display()
        ))
        .into());
    }
    entries.sort();
    Ok(entries)
}

/// Replaces the device's `web/dist` with the contents of `dist_dir`.
pub async fn deploy_frontend<R: RemoteDeployer>(
    remote: &R,
    host: Ipv4Addr,
    device: &DeviceConfig,
    dist_dir: &Path,
) -> Result<()> {
    let entries = dist_entries(dist_dir)?;
    let remote_dist = remote_dist_dir(device);
    let quoted_dist = shell_quote(&remote_dist);

    println!("🔄 Preparing {} on the Raspberry Pi...", remote_dist);
    remote
        .run(host, &format!("mkdir -p {}", quoted_dist))
        .await
        .context("Failed to create the web directory on the Raspberry Pi")?;
    remote
        .run(host, &format!("rm -rf {}/*", quoted_dist))
        .await
        .context("Failed to clear the previous frontend on the Raspberry Pi")?;

    println!("🔄 Copying {} entries to the Raspberry Pi...", entries.len());
    remote
        .copy(host, &entries, &format!("{}/", remote_dist))
        .await
        .context("Failed to copy the built frontend to the Raspberry Pi")?;
    println!("✅ Frontend deployed to the Raspberry Pi");
    Ok(())
}

/// Installs `web_server.py` under the device's remote root.
pub async fn install_web_server<R: RemoteDeployer>(
    remote: &R,
    host: Ipv4Addr,
    device: &DeviceConfig,
) -> Result<()> {
    let script = templating::render_web_server_script(&device.remote_root, WEB_SERVER_PORT)?;
    let local = std::env::temp_dir().join(format!("rpideploy-web_server-{}.py", std::process::id()));
    io::write_string_to_file(&local, &script)?;

    let remote_path = remote_script_path(device);
    println!("🔄 Installing web server on the Raspberry Pi...");
    let copied = remote
        .copy(host, std::slice::from_ref(&local), &remote_path)
        .await;
    if let Err(e) = std::fs::remove_file(&local) {
        warn!("Could not remove {}: {}", local.display(), e);
    }
    copied.context("Failed to install the web server script")?;

    remote
        .run(host, &format!("chmod +x {}", shell_quote(&remote_path)))
        .await
        .context("Failed to make the web server script executable")?;
    debug!("Installed {}", remote_path);
    println!("✅ Web server installed on the Raspberry Pi");
    Ok(())
}
