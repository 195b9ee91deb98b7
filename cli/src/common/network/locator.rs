//! # Network Service Locator (`common::network::locator`)
//!
//! File: cli/src/common/network/locator.rs
//!
//! ## Overview
//!
//! Finds the device running the autonomy API. Each call to `locate` walks
//! the stages below and stops at the first success:
//!
//! 1. **Cached check**: fingerprint the previously recorded address on its
//!    recorded port.
//! 2. **Scan**: ping every host of the local /24 through a pool of 50, then
//!    fingerprint the responders through a pool of 20. The first match to
//!    complete wins; later matches are ignored.
//! 3. **Fallback**: fingerprint a short list of conventional addresses
//!    (`.101`..`.105`, `.150`, `.200`) one at a time.
//!
//! The result is a `Discovery` value carrying the port the match was
//! confirmed on. The locator keeps no state between calls; the last known
//! location is passed in by the caller.
//!
//! ## Usage
//!
//! ```rust
//! let locator = network::system_locator();
//! let cached = LocationStore::new(&cfg.artifacts.location_file).load()?;
//! match locator.locate(cached.as_ref()).await {
//!     Discovery::Found { address, port, via } => println!("{}:{} ({})", address, port, via),
//!     Discovery::NotFound => println!("not found"),
//! }
//! ```
//!
use super::pool;
use super::probe::{FingerprintProbe, LivenessProbe};
use super::subnet::{self, Subnet};
use super::{API_PORT, FALLBACK_SUFFIXES, FINGERPRINT_WORKERS, LIVENESS_WORKERS};
use crate::core::location::ServiceLocation;
use std::fmt;
use std::net::{Ipv4Addr, SocketAddrV4};
use std::sync::Arc;
use tracing::{debug, info};

/// Which stage confirmed the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoundVia {
    Cache,
    Scan,
    Fallback,
}

impl fmt::Display for FoundVia {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FoundVia::Cache => write!(f, "cached address"),
            FoundVia::Scan => write!(f, "network scan"),
            FoundVia::Fallback => write!(f, "common address"),
        }
    }
}

/// Result of one discovery run. `port` is the port the fingerprint matched on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Discovery {
    Found {
        address: Ipv4Addr,
        port: u16,
        via: FoundVia,
    },
    NotFound,
}

#[cfg(test)]
impl Discovery {
    pub fn address(&self) -> Option<Ipv4Addr> {
        match self {
            Discovery::Found { address, .. } => Some(*address),
            Discovery::NotFound => None,
        }
    }
}

/// Discovery orchestrator over a liveness probe `L` and a fingerprint probe `F`.
pub struct Locator<L, F> {
    liveness: Arc<L>,
    fingerprint: Arc<F>,
    subnet: Option<Subnet>,
    port: u16,
    liveness_workers: usize,
    fingerprint_workers: usize,
}

impl<L: LivenessProbe, F: FingerprintProbe> Locator<L, F> {
    pub fn new(liveness: L, fingerprint: F) -> Self {
        Self {
            liveness: Arc::new(liveness),
            fingerprint: Arc::new(fingerprint),
            subnet: None,
            port: API_PORT,
            liveness_workers: LIVENESS_WORKERS,
            fingerprint_workers: FINGERPRINT_WORKERS,
        }
    }

    /// Scan `subnet` instead of the one derived from the local address.
    pub fn with_subnet(mut self, subnet: Subnet) -> Self {
        self.subnet = Some(subnet);
        self
    }

    /// Fingerprint scanned and fallback hosts on `port`.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    #[cfg(test)]
    pub(crate) fn with_workers(mut self, liveness: usize, fingerprint: usize) -> Self {
        self.liveness_workers = liveness;
        self.fingerprint_workers = fingerprint;
        self
    }

    #[cfg(test)]
    pub(crate) fn liveness(&self) -> &L {
        &self.liveness
    }

    /// Runs discovery, reusing `cached` when it still answers on its port.
    pub async fn locate(&self, cached: Option<&ServiceLocation>) -> Discovery {
        if let Some(previous) = cached {
            if self.answers(previous.address, previous.port).await {
                info!(
                    "Cached location {}:{} still answers",
                    previous.address, previous.port
                );
                return Discovery::Found {
                    address: previous.address,
                    port: previous.port,
                    via: FoundVia::Cache,
                };
            }
            info!(
                "Cached location {}:{} no longer answers, scanning",
                previous.address, previous.port
            );
        }

        let subnet = self.subnet.unwrap_or_else(subnet::resolve_local_subnet);
        println!("📡 Scanning network: {}.1-254", subnet);

        let reachable = self.reachable_hosts(subnet).await;
        println!("✅ Found {} reachable hosts", reachable.len());

        if !reachable.is_empty() {
            println!("🔍 Checking for the autonomy system API...");
            if let Some(address) = self.first_match(reachable).await {
                return Discovery::Found {
                    address,
                    port: self.port,
                    via: FoundVia::Scan,
                };
            }
        }

        println!("🔄 Checking common Raspberry Pi addresses...");
        if let Some(address) = self.check_fallbacks(subnet).await {
            return Discovery::Found {
                address,
                port: self.port,
                via: FoundVia::Fallback,
            };
        }

        info!("No autonomy API found in {}.0/24", subnet);
        Discovery::NotFound
    }

    async fn answers(&self, address: Ipv4Addr, port: u16) -> bool {
        let target = SocketAddrV4::new(address, port);
        let result = self.fingerprint.fingerprint(target).await;
        debug!(
            "Fingerprint {} -> {:?} in {:?}",
            target, result.status, result.elapsed
        );
        result.is_positive()
    }

    /// Hosts of `subnet` that answered a ping, in ascending order.
    pub async fn reachable_hosts(&self, subnet: Subnet) -> Vec<Ipv4Addr> {
        let liveness = Arc::clone(&self.liveness);
        let rx = pool::fan_out(subnet.hosts(), self.liveness_workers, move |address| {
            let liveness = Arc::clone(&liveness);
            async move {
                let result = liveness.ping(address).await;
                debug!(
                    "Ping {} -> {:?} in {:?}",
                    address, result.status, result.elapsed
                );
                if result.is_positive() {
                    println!("  📱 Found host: {}", address);
                    Some(address)
                } else {
                    None
                }
            }
        });
        let mut reachable = pool::collect(rx).await;
        reachable.sort_unstable();
        reachable
    }

    /// First host in `hosts` whose fingerprint matches, by completion order.
    async fn first_match(&self, hosts: Vec<Ipv4Addr>) -> Option<Ipv4Addr> {
        let fingerprint = Arc::clone(&self.fingerprint);
        let port = self.port;
        let mut rx = pool::fan_out(hosts, self.fingerprint_workers, move |address| {
            let fingerprint = Arc::clone(&fingerprint);
            async move {
                let result = fingerprint.fingerprint(SocketAddrV4::new(address, port)).await;
                debug!(
                    "Fingerprint {} -> {:?} in {:?}",
                    address, result.status, result.elapsed
                );
                result.is_positive().then_some(address)
            }
        });
        let found = rx.recv().await;
        if let Some(address) = found {
            println!("🎯 Found Raspberry Pi with autonomy system: {}", address);
        }
        found
    }

    async fn check_fallbacks(&self, subnet: Subnet) -> Option<Ipv4Addr> {
        for suffix in FALLBACK_SUFFIXES {
            let address = subnet.host(suffix);
            if self.answers(address, self.port).await {
                println!("🎯 Found Raspberry Pi at common address: {}", address);
                return Some(address);
            }
        }
        None
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::common::network::probe::{ProbeResult, ProbeStatus};
    use chrono::Utc;
    use std::collections::HashSet;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Liveness stub answering for a fixed set of hosts and recording calls.
    #[derive(Default)]
    pub(crate) struct StubLiveness {
        pub alive: HashSet<Ipv4Addr>,
        pub calls: Mutex<Vec<Ipv4Addr>>,
    }

    impl StubLiveness {
        pub fn answering(hosts: &[Ipv4Addr]) -> Self {
            Self {
                alive: hosts.iter().copied().collect(),
                calls: Mutex::default(),
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    impl LivenessProbe for StubLiveness {
        async fn ping(&self, address: Ipv4Addr) -> ProbeResult {
            self.calls.lock().unwrap().push(address);
            let status = if self.alive.contains(&address) {
                ProbeStatus::Reachable
            } else {
                ProbeStatus::Unknown
            };
            ProbeResult {
                address,
                status,
                elapsed: Duration::ZERO,
            }
        }
    }

    /// Fingerprint stub matching a fixed set of hosts and recording calls.
    /// Hosts match on any port unless `port` is set.
    #[derive(Default)]
    pub(crate) struct StubFingerprint {
        pub services: HashSet<Ipv4Addr>,
        pub port: Option<u16>,
        pub calls: Mutex<Vec<SocketAddrV4>>,
    }

    impl StubFingerprint {
        pub fn serving(hosts: &[Ipv4Addr]) -> Self {
            Self {
                services: hosts.iter().copied().collect(),
                port: None,
                calls: Mutex::default(),
            }
        }

        pub fn serving_on(hosts: &[Ipv4Addr], port: u16) -> Self {
            Self {
                port: Some(port),
                ..Self::serving(hosts)
            }
        }

        /// Probed addresses, in call order.
        pub fn calls(&self) -> Vec<Ipv4Addr> {
            self.targets().iter().map(|t| *t.ip()).collect()
        }

        pub fn targets(&self) -> Vec<SocketAddrV4> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl FingerprintProbe for StubFingerprint {
        async fn fingerprint(&self, target: SocketAddrV4) -> ProbeResult {
            self.calls.lock().unwrap().push(target);
            let address = *target.ip();
            let on_port = self.port.map_or(true, |port| port == target.port());
            let status = if on_port && self.services.contains(&address) {
                ProbeStatus::HasService
            } else {
                ProbeStatus::Unknown
            };
            ProbeResult {
                address,
                status,
                elapsed: Duration::ZERO,
            }
        }
    }

    /// Fingerprint stub that matches everything.
    struct AlwaysMatches;

    impl FingerprintProbe for AlwaysMatches {
        async fn fingerprint(&self, target: SocketAddrV4) -> ProbeResult {
            ProbeResult {
                address: *target.ip(),
                status: ProbeStatus::HasService,
                elapsed: Duration::ZERO,
            }
        }
    }

    const SUBNET: Subnet = Subnet::new(10, 0, 0);

    fn host(n: u8) -> Ipv4Addr {
        SUBNET.host(n)
    }

    #[tokio::test]
    async fn test_cached_location_skips_scan() {
        let locator =
            Locator::new(StubLiveness::default(), AlwaysMatches).with_subnet(SUBNET);
        let cached = ServiceLocation::new(host(77), 5000, Utc::now());

        let discovery = locator.locate(Some(&cached)).await;

        assert_eq!(
            discovery,
            Discovery::Found {
                address: host(77),
                port: 5000,
                via: FoundVia::Cache
            }
        );
        assert_eq!(locator.liveness.call_count(), 0);
    }

    #[tokio::test]
    async fn test_cached_location_checked_on_its_own_port() {
        let fingerprint = StubFingerprint::serving_on(&[host(77)], 5050);
        let locator = Locator::new(StubLiveness::default(), fingerprint).with_subnet(SUBNET);
        let cached = ServiceLocation::new(host(77), 5050, Utc::now());

        let discovery = locator.locate(Some(&cached)).await;

        assert_eq!(
            discovery,
            Discovery::Found {
                address: host(77),
                port: 5050,
                via: FoundVia::Cache
            }
        );
        assert_eq!(
            locator.fingerprint.targets(),
            vec![SocketAddrV4::new(host(77), 5050)]
        );
    }

    #[tokio::test]
    async fn test_scan_reports_the_scanned_port() {
        // Recorded on 5050, but the device now only answers on the API port.
        let fingerprint = StubFingerprint::serving_on(&[host(77)], API_PORT);
        let locator = Locator::new(StubLiveness::answering(&[host(77)]), fingerprint)
            .with_subnet(SUBNET);
        let cached = ServiceLocation::new(host(77), 5050, Utc::now());

        let discovery = locator.locate(Some(&cached)).await;

        assert_eq!(
            discovery,
            Discovery::Found {
                address: host(77),
                port: API_PORT,
                via: FoundVia::Scan
            }
        );
        assert_eq!(
            locator.fingerprint.targets(),
            vec![
                SocketAddrV4::new(host(77), 5050),
                SocketAddrV4::new(host(77), API_PORT)
            ]
        );
    }

    #[tokio::test]
    async fn test_with_port_changes_scanned_port() {
        let fingerprint = StubFingerprint::serving_on(&[host(102)], 8000);
        let locator = Locator::new(StubLiveness::default(), fingerprint)
            .with_subnet(SUBNET)
            .with_port(8000);

        let discovery = locator.locate(None).await;

        assert_eq!(
            discovery,
            Discovery::Found {
                address: host(102),
                port: 8000,
                via: FoundVia::Fallback
            }
        );
    }

    #[tokio::test]
    async fn test_stale_cache_falls_through_to_scan() {
        let liveness = StubLiveness::answering(&[host(5), host(42)]);
        let fingerprint = StubFingerprint::serving(&[host(42)]);
        let locator = Locator::new(liveness, fingerprint).with_subnet(SUBNET);
        let cached = ServiceLocation::new(host(9), 5000, Utc::now());

        let discovery = locator.locate(Some(&cached)).await;

        assert_eq!(
            discovery,
            Discovery::Found {
                address: host(42),
                port: API_PORT,
                via: FoundVia::Scan
            }
        );
        assert_eq!(locator.liveness.call_count(), 254);
        assert_eq!(locator.fingerprint.calls()[0], host(9));
    }

    #[tokio::test]
    async fn test_unreachable_hosts_never_fingerprinted() {
        let alive = [host(3), host(17), host(200)];
        let liveness = StubLiveness::answering(&alive);
        // Serves the API but does not answer pings: must not be found by the scan.
        let fingerprint = StubFingerprint::serving(&[host(17), host(50)]);
        let locator = Locator::new(liveness, fingerprint).with_subnet(SUBNET);

        let discovery = locator.locate(None).await;

        assert_eq!(
            discovery,
            Discovery::Found {
                address: host(17),
                port: API_PORT,
                via: FoundVia::Scan
            }
        );
        for probed in locator.fingerprint.calls() {
            assert!(alive.contains(&probed), "{} was never reachable", probed);
        }
    }

    #[tokio::test]
    async fn test_fallback_address_without_scan_fingerprint() {
        // Nothing answers pings; .102 serves the API.
        let locator = Locator::new(
            StubLiveness::default(),
            StubFingerprint::serving(&[host(102)]),
        )
        .with_subnet(SUBNET);

        let discovery = locator.locate(None).await;

        assert_eq!(
            discovery,
            Discovery::Found {
                address: host(102),
                port: API_PORT,
                via: FoundVia::Fallback
            }
        );
        assert_eq!(locator.liveness.call_count(), 254);
        // Only the sequential fallback list was fingerprinted, in order.
        assert_eq!(locator.fingerprint.calls(), vec![host(101), host(102)]);
    }

    #[tokio::test]
    async fn test_not_found_after_all_stages() {
        let locator = Locator::new(
            StubLiveness::answering(&[host(1), host(2)]),
            StubFingerprint::default(),
        )
        .with_subnet(SUBNET);

        let discovery = locator.locate(None).await;

        assert_eq!(discovery, Discovery::NotFound);
        assert_eq!(discovery.address(), None);
        let calls = locator.fingerprint.calls();
        assert_eq!(calls.len(), 2 + FALLBACK_SUFFIXES.len());
        assert_eq!(&calls[2..], FALLBACK_SUFFIXES.map(host).as_slice());
    }

    #[tokio::test]
    async fn test_reachable_hosts_sorted_and_complete() {
        let alive = [host(250), host(1), host(128)];
        let locator = Locator::new(StubLiveness::answering(&alive), StubFingerprint::default())
            .with_workers(7, 3);

        let reachable = locator.reachable_hosts(SUBNET).await;

        assert_eq!(reachable, vec![host(1), host(128), host(250)]);
    }

    #[tokio::test]
    async fn test_one_of_several_matches_is_returned() {
        let servers = [host(10), host(11), host(12)];
        let locator = Locator::new(
            StubLiveness::answering(&servers),
            StubFingerprint::serving(&servers),
        )
        .with_subnet(SUBNET);

        let address = locator.locate(None).await.address().unwrap();
        assert!(servers.contains(&address));
    }
}
