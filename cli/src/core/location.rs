//! # rpideploy Service Location Record
//!
//! File: cli/src/core/location.rs
//!
//! ## Overview
//!
//! A `ServiceLocation` is the single authoritative answer to "where is the
//! device": its IPv4 address, the API port, and when it was last confirmed.
//! It is persisted to one flat JSON file (`rpi_config.json` by default) and
//! is the only input to the generated artifacts.
//!
//! ## Architecture
//!
//! - `ServiceLocation`: the in-memory value. `base_url` and `stream_url` are
//!   derived, never stored independently.
//! - `LocationStore`: loads the JSON record and renders its replacement.
//!   The record is always written as a whole.
//! - `record`: renders the record and every artifact, stages them all, and
//!   only then moves them into place with the record last. Nothing else
//!   writes artifacts, so a failed write leaves the previous record and
//!   files in place.
//!
//! On disk:
//!
//! ```json
//! {
//!   "address": "10.0.0.42",
//!   "port": 5000,
//!   "last_updated": "2026-10-18T12:00:00Z",
//!   "base_url": "http://10.0.0.42:5000",
//!   "stream_url": "http://10.0.0.42:5000/video_feed"
//! }
//! ```
//!
//! Older records written with `rpi_ip` / `api_port` keys and a float unix
//! timestamp are still readable.
//!
use crate::common::fs::io;
use crate::core::config::ArtifactsConfig;
use crate::core::error::{DeployError, Result};
use crate::core::templating::{self, RenderedArtifact};
use anyhow::anyhow;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Path of the MJPEG stream served by the autonomy API.
pub const STREAM_PATH: &str = "/video_feed";

/// The confirmed location of the device API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceLocation {
    pub address: Ipv4Addr,
    pub port: u16,
    pub last_updated: DateTime<Utc>,
}

impl ServiceLocation {
    pub fn new(address: Ipv4Addr, port: u16, last_updated: DateTime<Utc>) -> Self {
        Self {
            address,
            port,
            last_updated,
        }
    }

    /// Location confirmed right now.
    pub fn confirmed_now(address: Ipv4Addr, port: u16) -> Self {
        Self::new(address, port, Utc::now())
    }

    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.address, self.port)
    }

    pub fn stream_url(&self) -> String {
        format!("{}{}", self.base_url(), STREAM_PATH)
    }
}

/// Serialized form of `ServiceLocation`.
#[derive(Serialize, Deserialize)]
struct LocationRecord {
    #[serde(alias = "rpi_ip")]
    address: Ipv4Addr,
    #[serde(alias = "api_port")]
    port: u16,
    #[serde(
        serialize_with = "serialize_timestamp",
        deserialize_with = "deserialize_timestamp"
    )]
    last_updated: DateTime<Utc>,
    // Derived on write; ignored on read.
    #[serde(default)]
    base_url: String,
    #[serde(default)]
    stream_url: String,
}

impl From<&ServiceLocation> for LocationRecord {
    fn from(location: &ServiceLocation) -> Self {
        Self {
            address: location.address,
            port: location.port,
            last_updated: location.last_updated,
            base_url: location.base_url(),
            stream_url: location.stream_url(),
        }
    }
}

impl From<LocationRecord> for ServiceLocation {
    fn from(record: LocationRecord) -> Self {
        Self::new(record.address, record.port, record.last_updated)
    }
}

fn serialize_timestamp<S: Serializer>(
    value: &DateTime<Utc>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Secs, true))
}

fn deserialize_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<DateTime<Utc>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawTimestamp {
        Unix(f64),
        Text(String),
    }

    match RawTimestamp::deserialize(deserializer)? {
        RawTimestamp::Unix(seconds) => {
            let whole = seconds.trunc() as i64;
            let nanos = (seconds.fract() * 1e9).round().clamp(0.0, 999_999_999.0) as u32;
            DateTime::from_timestamp(whole, nanos).ok_or_else(|| {
                serde::de::Error::custom(format!("unix timestamp {} out of range", seconds))
            })
        }
        RawTimestamp::Text(text) => DateTime::parse_from_rfc3339(&text)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom),
    }
}

/// Reads and writes the persisted location record.
#[derive(Debug, Clone)]
pub struct LocationStore {
    path: PathBuf,
}

impl LocationStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Loads the record. `Ok(None)` when no record exists yet; an error when
    /// the file exists but is not a valid record.
    pub fn load(&self) -> Result<Option<ServiceLocation>> {
        if !self.path.exists() {
            debug!("No location record at {}", self.path.display());
            return Ok(None);
        }
        let content = io::read_file_to_string(&self.path)?;
        let record: LocationRecord = serde_json::from_str(&content).map_err(|e| {
            anyhow!(DeployError::Location {
                path: self.path.display().to_string(),
                reason: e.to_string(),
            })
        })?;
        Ok(Some(record.into()))
    }

    /// Renders the record that replaces this store's file for `location`.
    pub fn render(&self, location: &ServiceLocation) -> Result<RenderedArtifact> {
        let mut content = serde_json::to_string_pretty(&LocationRecord::from(location))?;
        content.push('\n');
        Ok(RenderedArtifact {
            path: self.path.clone(),
            content,
        })
    }
}

/// Persists `location` together with every artifact derived from it.
///
/// Nothing is replaced unless the record and all artifacts were rendered
/// and staged. The record is moved into place last.
pub fn record(location: &ServiceLocation, artifacts: &ArtifactsConfig) -> Result<()> {
    let mut files = templating::render_artifacts(location, artifacts)?;
    files.push(LocationStore::new(&artifacts.location_file).render(location)?);

    let pairs: Vec<(&Path, &str)> = files
        .iter()
        .map(|file| (file.path.as_path(), file.content.as_str()))
        .collect();
    io::write_files_together(&pairs)?;
    info!(
        "Recorded {} and regenerated {} artifacts",
        location.base_url(),
        files.len() - 1
    );
    Ok(())
}
