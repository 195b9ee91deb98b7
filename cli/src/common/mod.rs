//! # rpideploy Common Utilities (`common`)
//!
//! File: cli/src/common/mod.rs
//!
//! ## Overview
//!
//! Shared building blocks used by the command handlers. Command-specific flow
//! lives in `commands::`; persisted state and configuration live in `core::`.
//!
//! ## Architecture
//!
//! - **`deploy`**: The `Builder`, `Publisher` and `RemoteDeployer` collaborator traits and their `npm` / `ssh` implementations.
//! - **`fs`**: File I/O with atomic writes.
//! - **`network`**: Subnet resolution, liveness and fingerprint probes, the bounded probe pool, and the discovery `Locator`.
//! - **`process`**: Running external commands, streamed or captured.
//! - **`system`**: Prerequisite tool checks.
//! - **`ui`**: Banners, step headings and yes/no prompts.
//!
//! ## Usage
//!
//! ```rust
//! use crate::common::{network, ui};
//!
//! let discovery = network::system_locator().locate(None).await;
//! ui::banner("Discovery finished");
//! ```
//!

/// Collaborators for the external build, publish and device steps.
pub mod deploy;
/// Filesystem helpers.
pub mod fs;
/// Device discovery on the local network.
pub mod network;
/// External process execution.
pub mod process;
/// Host tool checks.
pub mod system;
/// Terminal output and prompts.
pub mod ui;
