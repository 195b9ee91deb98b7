//! # rpideploy Command Modules
//!
//! File: cli/src/commands/mod.rs
//!
//! ## Overview
//!
//! One module per top-level command. Each defines its Clap arguments and an
//! async `handle_*` function called from `main.rs`.
//!
//! ## Commands
//!
//! - `discover`: `discover` and `configure`, finding or setting the device location
//! - `deploy`: install, build, publish and copy to the device
//! - `setup`: first-time setup with a fallback address when discovery fails
//! - `check`: report which device API endpoints respond
//!

/// Endpoint health report for the device API.
pub mod check;
/// Full deployment pipeline. Includes device copy and web server install.
pub mod deploy;
/// Device discovery and manual configuration.
pub mod discover;
/// First-time setup.
pub mod setup;
