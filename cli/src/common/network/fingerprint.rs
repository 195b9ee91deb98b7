//! # Fingerprint Prober (`common::network::fingerprint`)
//!
//! File: cli/src/common/network/fingerprint.rs
//!
//! Confirms that a host runs the autonomy API: `GET /api/system_status` on
//! the probed port must answer `200 OK` with a JSON object carrying at least one
//! of the signature keys (`system_status`, `cpu_usage`).
//!
//! Non-200 responses, bodies that are not JSON objects, timeouts and refused
//! connections all count as "no match".
//!
use super::probe::{FingerprintProbe, ProbeResult, ProbeStatus};
use super::{FINGERPRINT_TIMEOUT, SIGNATURE_KEYS, STATUS_PATH};
use reqwest::StatusCode;
use serde_json::Value;
use std::net::SocketAddrV4;
use std::time::{Duration, Instant};
use tracing::trace;

/// Whether a status payload looks like the autonomy API.
pub fn has_signature(body: &Value) -> bool {
    body.as_object()
        .is_some_and(|fields| SIGNATURE_KEYS.iter().any(|key| fields.contains_key(*key)))
}

/// Fetches `url` and checks the response against the API signature.
pub async fn matches_service(client: &reqwest::Client, url: &str, timeout: Duration) -> bool {
    let response = match client.get(url).timeout(timeout).send().await {
        Ok(response) => response,
        Err(e) => {
            trace!("GET {} failed: {}", url, e);
            return false;
        }
    };
    if response.status() != StatusCode::OK {
        trace!("GET {} answered {}", url, response.status());
        return false;
    }
    match response.json::<Value>().await {
        Ok(body) => has_signature(&body),
        Err(e) => {
            trace!("GET {} returned a non-JSON body: {}", url, e);
            false
        }
    }
}

/// Builds the HTTP client shared by all fingerprint probes.
pub fn probe_client(timeout: Duration) -> reqwest::Client {
    // Proxies would route LAN addresses away from the device.
    reqwest::Client::builder()
        .timeout(timeout)
        .no_proxy()
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// HTTP fingerprint probe against `http://{address}:{port}/api/system_status`.
#[derive(Debug, Clone)]
pub struct HttpFingerprint {
    client: reqwest::Client,
    timeout: Duration,
}

impl Default for HttpFingerprint {
    fn default() -> Self {
        Self {
            client: probe_client(FINGERPRINT_TIMEOUT),
            timeout: FINGERPRINT_TIMEOUT,
        }
    }
}

impl HttpFingerprint {
    pub fn new() -> Self {
        Self::default()
    }
}

pub fn status_url(target: SocketAddrV4) -> String {
    format!("http://{}{}", target, STATUS_PATH)
}

impl FingerprintProbe for HttpFingerprint {
    async fn fingerprint(&self, target: SocketAddrV4) -> ProbeResult {
        let started = Instant::now();
        let url = status_url(target);
        let status = if matches_service(&self.client, &url, self.timeout).await {
            ProbeStatus::HasService
        } else {
            ProbeStatus::Unknown
        };
        ProbeResult::since(*target.ip(), status, started)
    }
}
