//! # Liveness Prober (`common::network::liveness`)
//!
//! File: cli/src/common/network/liveness.rs
//!
//! Sends one ICMP echo request through the system `ping` utility. Raw ICMP
//! sockets need elevated privileges on most systems while `ping` is usually
//! setuid or capability-enabled, so shelling out works for ordinary users.
//!
//! Every failure mode (non-zero exit, `ping` missing, permission denied,
//! process timeout) yields `ProbeStatus::Unknown`.
//!
use super::probe::{LivenessProbe, ProbeResult, ProbeStatus};
use super::PING_PROCESS_TIMEOUT;
use std::net::Ipv4Addr;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::{debug, trace};

/// `ping`-based liveness probe.
#[derive(Debug, Clone)]
pub struct SystemPing {
    program: String,
    timeout: Duration,
}

impl Default for SystemPing {
    fn default() -> Self {
        Self {
            program: "ping".to_string(),
            timeout: PING_PROCESS_TIMEOUT,
        }
    }
}

impl SystemPing {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arguments for a single echo with a one second reply wait.
    fn echo_args(address: Ipv4Addr) -> Vec<String> {
        let mut args: Vec<String> = if cfg!(windows) {
            vec!["-n", "1", "-w", "1000"]
        } else if cfg!(target_os = "macos") {
            // macOS takes -W in milliseconds.
            vec!["-c", "1", "-W", "1000"]
        } else {
            vec!["-c", "1", "-W", "1"]
        }
        .into_iter()
        .map(String::from)
        .collect();
        args.push(address.to_string());
        args
    }

    fn command(&self, address: Ipv4Addr) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(Self::echo_args(address))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        cmd
    }
}

impl LivenessProbe for SystemPing {
    async fn ping(&self, address: Ipv4Addr) -> ProbeResult {
        let started = Instant::now();
        let status = match tokio::time::timeout(self.timeout, self.command(address).status()).await
        {
            Ok(Ok(exit)) if exit.success() => ProbeStatus::Reachable,
            Ok(Ok(exit)) => {
                trace!("{} did not answer ({})", address, exit);
                ProbeStatus::Unknown
            }
            Ok(Err(e)) => {
                debug!("Could not run '{}' for {}: {}", self.program, address, e);
                ProbeStatus::Unknown
            }
            Err(_) => {
                debug!("'{}' for {} timed out", self.program, address);
                ProbeStatus::Unknown
            }
        };
        ProbeResult::since(address, status, started)
    }
}
