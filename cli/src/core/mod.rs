//! # rpideploy Core Infrastructure
//!
//! File: cli/src/core/mod.rs
//!
//! ## Overview
//!
//! This module aggregates the core infrastructure components shared by the
//! command handlers: configuration, error types, the persisted device
//! location, and artifact templating.
//!
//! ## Architecture
//!
//! - `config`: Configuration loading, merging, and validation
//! - `error`: Error types and the crate-wide `Result` alias
//! - `location`: The `ServiceLocation` record and its JSON store
//! - `templating`: Rendering of `.env` files, the CI workflow, and the device web server script
//!
//! ## Usage
//!
//! ```rust
//! use crate::core::config; // For loading configuration
//! use crate::core::error::{DeployError, Result}; // For error handling
//! use crate::core::location::{self, LocationStore, ServiceLocation};
//! ```
//!
pub mod config;
pub mod error;
pub mod location;
pub mod templating;
