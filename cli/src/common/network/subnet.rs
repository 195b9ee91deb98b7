//! # Subnet Resolution (`common::network::subnet`)
//!
//! File: cli/src/common/network/subnet.rs
//!
//! Determines which /24 to scan. The local outbound address is found by
//! "connecting" a UDP socket toward a public address: connecting a datagram
//! socket only selects a route and binds a local address, no packet is sent.
//! The last octet is dropped to obtain the prefix. Any failure falls back to
//! `192.168.1`.
//!
use crate::core::error::DeployError;
use std::fmt;
use std::net::{Ipv4Addr, UdpSocket};
use std::str::FromStr;
use tracing::{debug, warn};

/// Prefix scanned when the local address cannot be determined.
pub const FALLBACK_SUBNET: Subnet = Subnet([192, 168, 1]);

/// Public address used only to select the outbound route.
const ROUTE_PROBE_TARGET: &str = "8.8.8.8:80";

/// A /24 network, stored as its first three octets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subnet([u8; 3]);

impl Subnet {
    pub const fn new(a: u8, b: u8, c: u8) -> Self {
        Subnet([a, b, c])
    }

    /// The /24 containing `address`.
    pub fn of(address: Ipv4Addr) -> Self {
        let [a, b, c, _] = address.octets();
        Subnet([a, b, c])
    }

    /// Host `suffix` within this subnet.
    pub fn host(&self, suffix: u8) -> Ipv4Addr {
        let [a, b, c] = self.0;
        Ipv4Addr::new(a, b, c, suffix)
    }

    /// Candidate hosts `.1` through `.254`.
    pub fn hosts(self) -> impl Iterator<Item = Ipv4Addr> {
        (1..=254u8).map(move |suffix| self.host(suffix))
    }

    #[cfg(test)]
    pub fn contains(&self, address: Ipv4Addr) -> bool {
        Subnet::of(address) == *self
    }
}

impl fmt::Display for Subnet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c] = self.0;
        write!(f, "{}.{}.{}", a, b, c)
    }
}

impl FromStr for Subnet {
    type Err = DeployError;

    /// Accepts `a.b.c`, or a full address `a.b.c.d` whose last octet is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            DeployError::ArgumentParsing(format!(
                "Invalid subnet '{}'. Expected three octets like 192.168.1",
                s
            ))
        };
        let octets = s
            .split('.')
            .map(|part| part.parse::<u8>())
            .collect::<Result<Vec<u8>, _>>()
            .map_err(|_| invalid())?;
        match octets.as_slice() {
            [a, b, c] | [a, b, c, _] => Ok(Subnet([*a, *b, *c])),
            _ => Err(invalid()),
        }
    }
}

/// The local IPv4 address used for outbound traffic, if any.
pub fn outbound_ipv4() -> Option<Ipv4Addr> {
    let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
    socket.connect(ROUTE_PROBE_TARGET).ok()?;
    match socket.local_addr().ok()?.ip() {
        std::net::IpAddr::V4(ip) if !ip.is_unspecified() => Some(ip),
        other => {
            debug!("Outbound address {} is not a usable IPv4 address", other);
            None
        }
    }
}

/// The /24 of the local outbound address, or `FALLBACK_SUBNET`.
pub fn resolve_local_subnet() -> Subnet {
    match outbound_ipv4() {
        Some(ip) => {
            debug!("Local outbound address: {}", ip);
            Subnet::of(ip)
        }
        None => {
            warn!(
                "Could not determine the local network, falling back to {}",
                FALLBACK_SUBNET
            );
            FALLBACK_SUBNET
        }
    }
}
