//! # SSH Remote Access (`common::deploy::remote`)
//!
//! File: cli/src/common/deploy/remote.rs
//!
//! `RemoteDeployer` over the system OpenSSH client. Authentication is left to
//! the user's SSH setup (keys or agent); `BatchMode` is not forced so that a
//! password prompt still works interactively.
//!
use super::RemoteDeployer;
use crate::common::process;
use crate::core::error::Result;
use std::net::Ipv4Addr;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct SshDeployer {
    username: String,
}

impl SshDeployer {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }

    /// `user@host` login for `host`.
    pub fn login(&self, host: Ipv4Addr) -> String {
        format!("{}@{}", self.username, host)
    }

    fn scp_args(&self, host: Ipv4Addr, sources: &[PathBuf], destination: &str) -> Vec<String> {
        let mut args = vec!["-r".to_string()];
        args.extend(sources.iter().map(|p| p.display().to_string()));
        args.push(format!("{}:{}", self.login(host), destination));
        args
    }
}

impl RemoteDeployer for SshDeployer {
    async fn run(&self, host: Ipv4Addr, command: &str) -> Result<()> {
        let login = self.login(host);
        process::run_streamed("ssh", &[&login, command], None).await
    }

    async fn copy(&self, host: Ipv4Addr, sources: &[PathBuf], destination: &str) -> Result<()> {
        let args = self.scp_args(host, sources, destination);
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        process::run_streamed("scp", &args, None).await
    }
}
