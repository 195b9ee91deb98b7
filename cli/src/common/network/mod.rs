//! # rpideploy Network Utilities (`common::network`)
//!
//! File: cli/src/common/network/mod.rs
//!
//! ## Overview
//!
//! Everything needed to find the device on the local network:
//!
//! - **`subnet`**: the local /24 and its candidate hosts.
//! - **`probe`**: `ProbeResult` and the `LivenessProbe` / `FingerprintProbe` traits.
//! - **`liveness`**: `SystemPing`, an ICMP echo through the system `ping`.
//! - **`fingerprint`**: `HttpFingerprint`, the `GET /api/system_status` signature check.
//! - **`pool`**: bounded fan-out of probe tasks with a channel for results.
//! - **`locator`**: the discovery stages (cached check, scan, fallback list).
//!
//! Timeouts and pool sizes are fixed here rather than exposed as
//! configuration. The scanned port defaults to `API_PORT`.
//!
//! ## Usage
//!
//! ```rust
//! use crate::common::network::{self, Discovery};
//!
//! let discovery = network::system_locator().locate(cached.as_ref()).await;
//! if let Discovery::Found { address, port, .. } = discovery {
//!     println!("Device at {}:{}", address, port);
//! }
//! ```
//!
use std::time::Duration;

pub mod fingerprint;
pub mod liveness;
pub mod locator;
pub mod pool;
pub mod probe;
pub mod subnet;

pub use fingerprint::HttpFingerprint;
pub use liveness::SystemPing;
pub use locator::{Discovery, FoundVia, Locator};
pub use subnet::Subnet;

/// Port the autonomy API listens on.
pub const API_PORT: u16 = 5000;
/// Status endpoint used for fingerprinting.
pub const STATUS_PATH: &str = "/api/system_status";
/// Top-level keys that identify the autonomy API's status payload.
pub const SIGNATURE_KEYS: [&str; 2] = ["system_status", "cpu_usage"];

/// Upper bound on one `ping` process (the echo itself waits one second).
pub const PING_PROCESS_TIMEOUT: Duration = Duration::from_secs(2);
/// Timeout for one fingerprint request.
pub const FINGERPRINT_TIMEOUT: Duration = Duration::from_secs(3);

/// Concurrent pings during a scan.
pub const LIVENESS_WORKERS: usize = 50;
/// Concurrent fingerprint requests during a scan.
pub const FINGERPRINT_WORKERS: usize = 20;

/// Host suffixes commonly handed out to the device, tried in order.
pub const FALLBACK_SUFFIXES: [u8; 7] = [101, 102, 103, 104, 105, 150, 200];

/// Locator backed by the real `ping` and HTTP probes.
pub fn system_locator() -> Locator<SystemPing, HttpFingerprint> {
    Locator::new(SystemPing::new(), HttpFingerprint::new())
}
