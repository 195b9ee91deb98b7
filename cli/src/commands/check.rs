//! # rpideploy Check Command
//!
//! File: cli/src/commands/check.rs
//!
//! ## Overview
//!
//! `rpideploy check` asks each known API endpoint of the device for a
//! response and reports how many answered. Any HTTP response counts as
//! answering; only transport failures (refused, timeout) count against it.
//!
//! The target defaults to the recorded location. `--address` or `--base-url`
//! override it.
//!
//! ```bash
//! rpideploy check
//! rpideploy check --address 10.0.0.42
//! rpideploy check --base-url http://localhost:5000
//! ```
//!
use crate::commands::discover;
use crate::common::network::{fingerprint, API_PORT};
use crate::common::ui;
use crate::core::config;
use crate::core::error::{DeployError, Result};
use crate::core::location::STREAM_PATH;
use clap::Parser;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use serde_json::Value;
use std::net::Ipv4Addr;
use std::time::Duration;
use tracing::debug;

/// Timeout for one endpoint request.
pub const CHECK_TIMEOUT: Duration = Duration::from_secs(5);
/// JSON bodies are summarized to this many characters.
const SUMMARY_CHARS: usize = 200;

/// Endpoints exercised by `check`, in order.
pub const ENDPOINTS: &[&str] = &[
    "/api/system_status",
    "/api/slam_map",
    "/api/voice_status",
    STREAM_PATH,
    "/",
];

/// Arguments for `rpideploy check`.
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Device address (API port 5000).
    #[arg(long, value_name = "IP", conflicts_with = "base_url")]
    pub address: Option<Ipv4Addr>,
    /// Full API base URL, e.g. `http://10.0.0.42:5000`.
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,
}

/// Outcome for one endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointReport {
    pub path: &'static str,
    pub outcome: std::result::Result<EndpointResponse, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    /// Start of the pretty-printed JSON body, for 200 JSON responses.
    pub summary: Option<String>,
}

impl EndpointReport {
    pub fn responding(&self) -> bool {
        self.outcome.is_ok()
    }
}

fn summarize(body: &Value) -> String {
    let pretty = serde_json::to_string_pretty(body).unwrap_or_default();
    pretty.chars().take(SUMMARY_CHARS).collect()
}

/// Requests `path` below `base_url`. The streaming endpoint's body is never read.
pub async fn check_endpoint(
    client: &reqwest::Client,
    base_url: &str,
    path: &'static str,
) -> EndpointReport {
    let url = format!("{}{}", base_url.trim_end_matches('/'), path);
    let response = match client.get(&url).timeout(CHECK_TIMEOUT).send().await {
        Ok(response) => response,
        Err(e) => {
            debug!("GET {} failed: {:?}", url, e);
            return EndpointReport {
                path,
                outcome: Err(e.to_string()),
            };
        }
    };

    let status = response.status();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let is_json = content_type
        .as_deref()
        .is_some_and(|ct| ct.starts_with("application/json"));

    let summary = if status == StatusCode::OK && is_json && path != STREAM_PATH {
        response.json::<Value>().await.ok().map(|body| summarize(&body))
    } else {
        None
    };

    EndpointReport {
        path,
        outcome: Ok(EndpointResponse {
            status,
            content_type,
            summary,
        }),
    }
}

/// Checks every endpoint in order, printing one block per endpoint.
pub async fn check_all(base_url: &str) -> Vec<EndpointReport> {
    let client = fingerprint::probe_client(CHECK_TIMEOUT);
    let mut reports = Vec::with_capacity(ENDPOINTS.len());
    for &path in ENDPOINTS {
        let report = check_endpoint(&client, base_url, path).await;
        print_report(&report);
        reports.push(report);
    }
    reports
}

fn print_report(report: &EndpointReport) {
    match &report.outcome {
        Ok(response) => {
            println!("✅ GET {}: {}", report.path, response.status.as_u16());
            if let Some(summary) = &response.summary {
                println!("   Data: {}...", summary);
            } else if response.status == StatusCode::OK {
                println!(
                    "   Content-Type: {}",
                    response.content_type.as_deref().unwrap_or("unknown")
                );
            }
        }
        Err(e) => println!("❌ GET {}: ERROR - {}", report.path, e),
    }
}

fn resolve_base_url(args: &CheckArgs) -> Result<String> {
    if let Some(url) = &args.base_url {
        return Ok(url.trim_end_matches('/').to_string());
    }
    if let Some(address) = args.address {
        return Ok(format!("http://{}:{}", address, API_PORT));
    }
    let cfg = config::load_config()?;
    discover::load_cached(&cfg.artifacts)
        .map(|location| location.base_url())
        .ok_or_else(|| {
            DeployError::Config(format!(
                "No recorded location in {}. Run 'rpideploy discover' or pass --address.",
                cfg.artifacts.location_file
            ))
            .into()
        })
}

pub async fn handle_check(args: CheckArgs) -> Result<()> {
    let base_url = resolve_base_url(&args)?;

    ui::banner("🚀 Testing Raspberry Pi Backend API Endpoints");
    println!("🔌 Testing connection to {}", base_url);

    let reports = check_all(&base_url).await;
    let responding = reports.iter().filter(|r| r.responding()).count();

    println!();
    println!("{}", "=".repeat(50));
    println!(
        "📊 Test Results: {}/{} endpoints responding",
        responding,
        reports.len()
    );
    if responding == reports.len() {
        println!("🎉 All endpoints are responding");
    } else {
        println!("⚠️ Some endpoints are not responding");
        println!("💡 Make sure the backend is running on the Raspberry Pi");
    }
    println!("\n🌐 Backend URL: {}", base_url);
    println!("📹 Stream URL: {}{}", base_url, STREAM_PATH);

    if responding == 0 {
        anyhow::bail!("No endpoint at {} responded", base_url);
    }
    Ok(())
}
