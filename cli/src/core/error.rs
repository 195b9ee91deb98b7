//! # rpideploy Error Types
//!
//! File: cli/src/core/error.rs
//!
//! ## Overview
//!
//! This module defines the error types used throughout rpideploy. Specific
//! failure kinds are modelled by `DeployError`; everything is carried through
//! the application as `anyhow::Error` so call sites can attach context.
//!
//! ## Architecture
//!
//! - `DeployError`: a `thiserror` enum for the failures the application
//!   distinguishes (configuration, filesystem, templating, the persisted
//!   location record, external commands, total discovery failure).
//! - `Result<T>`: an alias for `anyhow::Result<T>`.
//!
//! Transient network failures during probing never reach this module: the
//! probers fold them into "no match" before returning.
//!
//! ## Examples
//!
//! ```rust
//! // Return a specific error type
//! if location.is_none() {
//!     anyhow::bail!(DeployError::DiscoveryFailed);
//! }
//!
//! // Add context to errors using anyhow
//! let content = fs::read_to_string(&path)
//!     .with_context(|| format!("Failed to read file: {}", path.display()))?;
//! ```
//!
use thiserror::Error;

/// Custom error type for rpideploy.
#[derive(Error, Debug)]
pub enum DeployError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Filesystem error: {0}")]
    FileSystem(String),

    #[error("Template rendering error: {source}")]
    Template {
        #[from]
        source: tera::Error,
    },

    #[error("Invalid location record '{path}': {reason}")]
    Location { path: String, reason: String },

    #[error("External command failed: {cmd}, Status: {status}, Output:\n{output}")]
    ExternalCommand {
        cmd: String,
        status: String,
        output: String,
    },

    #[error("No device running the autonomy API was found on the network.")]
    DiscoveryFailed,

    #[error("Argument parsing error: {0}")]
    ArgumentParsing(String),
}

/// Type alias for Result using anyhow::Error for broad compatibility.
pub type Result<T> = anyhow::Result<T>;
