//! # Probe Types (`common::network::probe`)
//!
//! File: cli/src/common/network/probe.rs
//!
//! The two probe seams used by the locator. Each probe takes one address and
//! always produces a `ProbeResult`; failures of any kind are reported as
//! `ProbeStatus::Unknown` rather than as errors.
//!
use std::future::Future;
use std::net::{Ipv4Addr, SocketAddrV4};
use std::time::{Duration, Instant};

/// Outcome of a single probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeStatus {
    /// Answered an echo request.
    Reachable,
    /// Serves the autonomy API.
    HasService,
    /// No answer, wrong answer, or the probe could not run.
    Unknown,
}

/// A probe outcome plus its latency, used for logging only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeResult {
    pub address: Ipv4Addr,
    pub status: ProbeStatus,
    pub elapsed: Duration,
}

impl ProbeResult {
    /// Result for a probe of `address` that started at `started`.
    pub fn since(address: Ipv4Addr, status: ProbeStatus, started: Instant) -> Self {
        Self {
            address,
            status,
            elapsed: started.elapsed(),
        }
    }

    pub fn is_positive(&self) -> bool {
        self.status != ProbeStatus::Unknown
    }
}

/// Host reachability check.
pub trait LivenessProbe: Send + Sync + 'static {
    fn ping(&self, address: Ipv4Addr) -> impl Future<Output = ProbeResult> + Send;
}

/// Application-level check that `target` serves the autonomy API.
pub trait FingerprintProbe: Send + Sync + 'static {
    fn fingerprint(&self, target: SocketAddrV4) -> impl Future<Output = ProbeResult> + Send;
}
