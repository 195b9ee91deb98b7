//! # rpideploy System Utilities (`common::system`)
//!
//! File: cli/src/common/system/mod.rs
//!
//! ## Overview
//!
//! Checks that the host has the external tools the deployment steps shell out
//! to. Each tool is asked for `--version`; a tool that cannot be run, or exits
//! non-zero, counts as missing.
//!
//! ```rust
//! let report = system::check_tools(system::PREREQUISITES).await;
//! if !report.all_present() {
//!     anyhow::bail!("Missing tools: {}", report.missing().join(", "));
//! }
//! ```
//!
use crate::common::process;
use tracing::debug;

/// A required host tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tool {
    pub program: &'static str,
    pub label: &'static str,
}

/// Tools needed by `setup` and `deploy`.
pub const PREREQUISITES: &[Tool] = &[
    Tool {
        program: "node",
        label: "Node.js",
    },
    Tool {
        program: "npm",
        label: "npm",
    },
    Tool {
        program: "git",
        label: "Git",
    },
    Tool {
        program: "ssh",
        label: "OpenSSH",
    },
];

/// Result of checking one tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolStatus {
    pub tool: Tool,
    /// First line of the `--version` output, or `None` when missing.
    pub version: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ToolReport {
    pub statuses: Vec<ToolStatus>,
}

impl ToolReport {
    pub fn all_present(&self) -> bool {
        self.statuses.iter().all(|s| s.version.is_some())
    }

    pub fn missing(&self) -> Vec<&'static str> {
        self.statuses
            .iter()
            .filter(|s| s.version.is_none())
            .map(|s| s.tool.label)
            .collect()
    }
}

/// Asks `program --version`; `None` when it cannot be run.
pub async fn tool_version(program: &str) -> Option<String> {
    // `ssh -V` prints to stderr, so fall back to it when `--version` fails.
    let attempts: [&[&str]; 2] = [&["--version"], &["-V"]];
    for args in attempts {
        match process::run_capture(program, args).await {
            Ok(out) => {
                let first = out.lines().next().unwrap_or_default().trim().to_string();
                return Some(if first.is_empty() {
                    "installed".to_string()
                } else {
                    first
                });
            }
            Err(e) => debug!("'{} {}' failed: {}", program, args.join(" "), e),
        }
    }
    None
}

/// Checks every tool in `tools`, printing one line per tool.
pub async fn check_tools(tools: &[Tool]) -> ToolReport {
    let mut report = ToolReport::default();
    for tool in tools {
        let version = tool_version(tool.program).await;
        match &version {
            Some(v) => println!("✅ {}: {}", tool.label, v),
            None => println!("❌ {} not found. Please install {} first.", tool.label, tool.label),
        }
        report.statuses.push(ToolStatus {
            tool: *tool,
            version,
        });
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_tool_reported() {
        let missing = Tool {
            program: "rpideploy-no-such-tool",
            label: "Nothing",
        };
        let report = check_tools(&[missing]).await;
        assert!(!report.all_present());
        assert_eq!(report.missing(), vec!["Nothing"]);
    }

    #[test]
    fn test_empty_report_is_complete() {
        assert!(ToolReport::default().all_present());
    }

    #[test]
    fn test_prerequisites_cover_deploy_tools() {
        let programs: Vec<_> = PREREQUISITES.iter().map(|t| t.program).collect();
        for needed in ["node", "npm", "git", "ssh"] {
            assert!(programs.contains(&needed), "{} missing", needed);
        }
    }
}
