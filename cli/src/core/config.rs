//! # rpideploy Configuration System
//!
//! File: cli/src/core/config.rs
//!
//! ## Overview
//!
//! This module loads, merges and validates the rpideploy configuration. The
//! configuration covers where generated artifacts are written, how to reach
//! the device over SSH, and which package manager scripts build and publish
//! the frontend.
//!
//! Discovery itself is deliberately not configurable here: the API port,
//! probe timeouts and worker pool sizes are constants in
//! `common::network`.
//!
//! ## Architecture
//!
//! Configuration sources (in order of precedence):
//! 1. Project-specific `.rpideploy.toml` in the current directory or ancestors
//!    (the search stops at a directory containing `.git`)
//! 2. User-specific `config.toml` in the platform config directory
//! 3. Default values defined in the code
//!
//! Local paths are expanded (`~` to the home directory). Relative artifact
//! paths are then anchored at the project root: the nearest directory holding
//! `.rpideploy.toml` or `.git`, or the starting directory when there is none.
//! Remote paths in the `[device]` section are left untouched since they are
//! resolved by the remote shell, but `device.remote_root` must name a
//! directory below `/`.
//!
//! ## Examples
//!
//! ```toml
//! [artifacts]
//! location_file = "rpi_config.json"
//! update_interval_ms = 1000
//!
//! [device]
//! username = "pi"
//! remote_root = "~/autonomy_system"
//!
//! [build]
//! package_manager = "pnpm"
//! ```
//!
//! ```rust
//! let cfg = config::load_config()?;
//! let store = LocationStore::new(&cfg.artifacts.location_file);
//! ```
//!
use crate::core::error::{DeployError, Result};
use anyhow::{anyhow, Context};
use directories::ProjectDirs;
use serde::Deserialize;
use std::net::Ipv4Addr;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

/// Represents the main configuration structure, loaded from TOML files.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub artifacts: ArtifactsConfig,
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default)]
    pub build: BuildConfig,
    /// Directory that relative paths and package scripts resolve against.
    #[serde(skip)]
    pub project_root: PathBuf,
}

/// Where the location record and the generated files live.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ArtifactsConfig {
    /// Persisted `ServiceLocation` record (JSON).
    #[serde(default = "default_location_file")]
    pub location_file: String,
    /// Development environment file.
    #[serde(default = "default_env_file")]
    pub env_file: String,
    /// Production environment file.
    #[serde(default = "default_production_env_file")]
    pub production_env_file: String,
    /// GitHub Pages workflow definition.
    #[serde(default = "default_workflow_file")]
    pub workflow_file: String,
    /// Frontend polling interval written as `VITE_UPDATE_INTERVAL`.
    #[serde(default = "default_update_interval_ms")]
    pub update_interval_ms: u64,
}

/// How to reach the device over SSH/SCP.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DeviceConfig {
    /// SSH login on the device.
    #[serde(default = "default_username")]
    pub username: String,
    /// Autonomy system directory on the device (resolved by the remote shell).
    #[serde(default = "default_remote_root")]
    pub remote_root: String,
    /// Address recorded by `setup` when discovery finds nothing.
    #[serde(default = "default_fallback_address")]
    pub fallback_address: String,
}

/// Package manager scripts used to build and publish the frontend.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct BuildConfig {
    #[serde(default = "default_package_manager")]
    pub package_manager: String,
    #[serde(default = "default_build_script")]
    pub build_script: String,
    #[serde(default = "default_publish_script")]
    pub publish_script: String,
    /// Local build output copied to the device.
    #[serde(default = "default_dist_dir")]
    pub dist_dir: String,
    /// Public GitHub Pages URL, shown in summaries when set.
    pub pages_url: Option<String>,
}

fn default_location_file() -> String {
    "rpi_config.json".to_string()
}
fn default_env_file() -> String {
    ".env".to_string()
}
fn default_production_env_file() -> String {
    ".env.production".to_string()
}
fn default_workflow_file() -> String {
    ".github/workflows/deploy.yml".to_string()
}
fn default_update_interval_ms() -> u64 {
    2000
}
fn default_username() -> String {
    "pi".to_string()
}
fn default_remote_root() -> String {
    "~/autonomy_system".to_string()
}
fn default_fallback_address() -> String {
    "192.168.1.100".to_string()
}
fn default_package_manager() -> String {
    "npm".to_string()
}
fn default_build_script() -> String {
    "build:prod".to_string()
}
fn default_publish_script() -> String {
    "deploy".to_string()
}
fn default_dist_dir() -> String {
    "dist".to_string()
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            location_file: default_location_file(),
            env_file: default_env_file(),
            production_env_file: default_production_env_file(),
            workflow_file: default_workflow_file(),
            update_interval_ms: default_update_interval_ms(),
        }
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            username: default_username(),
            remote_root: default_remote_root(),
            fallback_address: default_fallback_address(),
        }
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            package_manager: default_package_manager(),
            build_script: default_build_script(),
            publish_script: default_publish_script(),
            dist_dir: default_dist_dir(),
            pages_url: None,
        }
    }
}

impl DeviceConfig {
    /// Parsed `fallback_address`. Only valid after `validate_config`.
    pub fn fallback_ip(&self) -> Result<Ipv4Addr> {
        self.fallback_address.parse().map_err(|_| {
            anyhow!(DeployError::Config(format!(
                "Invalid fallback address '{}'. Expected an IPv4 address.",
                self.fallback_address
            )))
        })
    }
}

const PROJECT_CONFIG_FILENAME: &str = ".rpideploy.toml";

/// Loads the merged configuration for the current working directory.
pub fn load_config() -> Result<Config> {
    let current_dir = std::env::current_dir().context("Failed to get current directory")?;
    load_config_in(&current_dir)
}

/// Loads the merged configuration as seen from `start_dir`.
pub fn load_config_in(start_dir: &Path) -> Result<Config> {
    let user_config = load_user_config()?;
    let project_config = load_project_config(start_dir)?;
    let mut merged_config = merge_configs(user_config.unwrap_or_default(), project_config);
    expand_config_paths(&mut merged_config).context("Failed to expand paths in configuration")?;
    validate_config(&merged_config).context("Configuration validation failed")?;
    let root = find_project_root(start_dir).unwrap_or(start_dir);
    anchor_artifact_paths(&mut merged_config, root);
    debug!("Final loaded configuration: {:?}", merged_config);
    Ok(merged_config)
}

fn load_user_config() -> Result<Option<Config>> {
    if let Some(proj_dirs) = ProjectDirs::from("com", "rpideploy", "rpideploy") {
        let config_path = proj_dirs.config_dir().join("config.toml");
        if config_path.exists() {
            info!("Loading user configuration from: {}", config_path.display());
            load_config_from_path(&config_path).map(Some)
        } else {
            debug!(
                "User configuration file not found at {}",
                config_path.display()
            );
            Ok(None)
        }
    } else {
        warn!("Could not determine user config directory.");
        Ok(None)
    }
}

fn load_project_config(start_dir: &Path) -> Result<Option<Config>> {
    if let Some(project_config_path) = find_project_config_path(start_dir) {
        info!(
            "Loading project configuration from: {}",
            project_config_path.display()
        );
        load_config_from_path(&project_config_path).map(Some)
    } else {
        debug!(
            "No project configuration file ({}) found in {} or ancestors.",
            PROJECT_CONFIG_FILENAME,
            start_dir.display()
        );
        Ok(None)
    }
}

/// Nearest directory at or above `start_dir` holding the project config or `.git`.
fn find_project_root(start_dir: &Path) -> Option<&Path> {
    start_dir
        .ancestors()
        .find(|dir| dir.join(PROJECT_CONFIG_FILENAME).is_file() || dir.join(".git").is_dir())
}

fn find_project_config_path(start_dir: &Path) -> Option<PathBuf> {
    let root = find_project_root(start_dir)?;
    let project_config = root.join(PROJECT_CONFIG_FILENAME);
    if project_config.is_file() {
        Some(project_config)
    } else {
        debug!(
            "Found .git directory at {}, stopping project config search.",
            root.display()
        );
        None
    }
}

fn load_config_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse TOML from file: {}", path.display()))
}

/// Project value if it differs from the built-in default, otherwise the user value.
fn pick<T: PartialEq>(project: T, user: T, default: T) -> T {
    if project != default {
        project
    } else {
        user
    }
}

fn merge_configs(user: Config, project: Option<Config>) -> Config {
    let project = match project {
        Some(p) => p,
        None => return user,
    };
    Config {
        artifacts: ArtifactsConfig {
            location_file: pick(
                project.artifacts.location_file,
                user.artifacts.location_file,
                default_location_file(),
            ),
            env_file: pick(
                project.artifacts.env_file,
                user.artifacts.env_file,
                default_env_file(),
            ),
            production_env_file: pick(
                project.artifacts.production_env_file,
                user.artifacts.production_env_file,
                default_production_env_file(),
            ),
            workflow_file: pick(
                project.artifacts.workflow_file,
                user.artifacts.workflow_file,
                default_workflow_file(),
            ),
            update_interval_ms: pick(
                project.artifacts.update_interval_ms,
                user.artifacts.update_interval_ms,
                default_update_interval_ms(),
            ),
        },
        device: DeviceConfig {
            username: pick(
                project.device.username,
                user.device.username,
                default_username(),
            ),
            remote_root: pick(
                project.device.remote_root,
                user.device.remote_root,
                default_remote_root(),
            ),
            fallback_address: pick(
                project.device.fallback_address,
                user.device.fallback_address,
                default_fallback_address(),
            ),
        },
        build: BuildConfig {
            package_manager: pick(
                project.build.package_manager,
                user.build.package_manager,
                default_package_manager(),
            ),
            build_script: pick(
                project.build.build_script,
                user.build.build_script,
                default_build_script(),
            ),
            publish_script: pick(
                project.build.publish_script,
                user.build.publish_script,
                default_publish_script(),
            ),
            dist_dir: pick(
                project.build.dist_dir,
                user.build.dist_dir,
                default_dist_dir(),
            ),
            pages_url: project.build.pages_url.or(user.build.pages_url),
        },
        project_root: PathBuf::new(),
    }
}

fn expand_config_paths(config: &mut Config) -> Result<()> {
    debug!("Expanding local paths in configuration...");
    let artifacts = &mut config.artifacts;
    for path in [
        &mut artifacts.location_file,
        &mut artifacts.env_file,
        &mut artifacts.production_env_file,
        &mut artifacts.workflow_file,
        &mut config.build.dist_dir,
    ] {
        *path = shellexpand::tilde(path.as_str()).into_owned();
    }
    Ok(())
}

/// Joins relative artifact paths onto `root` and records it as the project root.
fn anchor_artifact_paths(config: &mut Config, root: &Path) {
    let artifacts = &mut config.artifacts;
    for path in [
        &mut artifacts.location_file,
        &mut artifacts.env_file,
        &mut artifacts.production_env_file,
        &mut artifacts.workflow_file,
    ] {
        if Path::new(path.as_str()).is_relative() {
            *path = root.join(path.as_str()).display().to_string();
        }
    }
    config.project_root = root.to_path_buf();
    debug!("Artifact paths anchored at {}", root.display());
}

fn validate_config(config: &Config) -> Result<()> {
    info!("Validating final configuration...");
    let paths = [
        ("artifacts.location_file", &config.artifacts.location_file),
        ("artifacts.env_file", &config.artifacts.env_file),
        (
            "artifacts.production_env_file",
            &config.artifacts.production_env_file,
        ),
        ("artifacts.workflow_file", &config.artifacts.workflow_file),
        ("build.dist_dir", &config.build.dist_dir),
    ];
    for (key, value) in paths {
        if value.trim().is_empty() {
            return Err(anyhow!(DeployError::Config(format!(
                "'{}' cannot be empty.",
                key
            ))));
        }
    }
    if config.artifacts.update_interval_ms == 0 {
        return Err(anyhow!(DeployError::Config(
            "'artifacts.update_interval_ms' must be greater than zero.".to_string()
        )));
    }
    if config.device.username.trim().is_empty() {
        return Err(anyhow!(DeployError::Config(
            "'device.username' cannot be empty.".to_string()
        )));
    }
    if config.device.remote_root.trim().trim_end_matches('/').is_empty() {
        return Err(anyhow!(DeployError::Config(format!(
            "'device.remote_root' must name a directory below '/', got '{}'.",
            config.device.remote_root
        ))));
    }
    config.device.fallback_ip()?;
    info!("Configuration validation successful.");
    Ok(())
}
