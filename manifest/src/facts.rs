//! Provisioning facts carried by a manifest.
//!
//! `RawFacts` is what a source hands over, every mandatory field possibly
//! absent or malformed. `ManifestFacts` only exists once those fields have
//! been checked, so the encoder never sees a placeholder.

use core::fmt;
use std::net::Ipv4Addr;

use tracing::warn;

use crate::error::ManifestError;
use crate::tlv::{BRIDGE_IPV4_LEN, BUILD_UUID_LEN};

/// Bridge interface address and prefix length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BridgeConfig {
    pub addr: Ipv4Addr,
    /// Stored as one byte. Not range-checked against 32.
    pub prefix: u8,
}

impl BridgeConfig {
    pub fn new(addr: Ipv4Addr, prefix: u8) -> Self {
        Self { addr, prefix }
    }

    /// Octets in network order, then the prefix byte.
    pub fn to_bytes(&self) -> [u8; BRIDGE_IPV4_LEN] {
        let [a, b, c, d] = self.addr.octets();
        [a, b, c, d, self.prefix]
    }

    pub fn from_bytes(raw: &[u8; BRIDGE_IPV4_LEN]) -> Self {
        Self {
            addr: Ipv4Addr::new(raw[0], raw[1], raw[2], raw[3]),
            prefix: raw[4],
        }
    }
}

impl fmt::Display for BridgeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.addr, self.prefix)
    }
}

/// Validated facts, ready to encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ManifestFacts {
    pub build_uuid: [u8; BUILD_UUID_LEN],
    pub bridge: BridgeConfig,
    pub egress_nat: bool,
}

/// Facts as gathered, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFacts {
    pub build_uuid: Option<Vec<u8>>,
    pub bridge_ipv4: Option<Vec<u8>>,
    pub prefix: Option<u8>,
    pub egress_nat: bool,
}

impl TryFrom<&RawFacts> for ManifestFacts {
    type Error = ManifestError;

    fn try_from(raw: &RawFacts) -> Result<Self, Self::Error> {
        let build_uuid: [u8; BUILD_UUID_LEN] = raw
            .build_uuid
            .as_deref()
            .and_then(|b| b.try_into().ok())
            .ok_or(ManifestError::InvalidField("build_uuid"))?;

        let octets: [u8; 4] = raw
            .bridge_ipv4
            .as_deref()
            .and_then(|b| b.try_into().ok())
            .ok_or(ManifestError::InvalidField("bridge_ipv4"))?;
        let prefix = raw.prefix.ok_or(ManifestError::InvalidField("bridge_ipv4"))?;
        if prefix > 32 {
            warn!(prefix, "bridge prefix exceeds 32, encoding as given");
        }

        Ok(Self {
            build_uuid,
            bridge: BridgeConfig::new(Ipv4Addr::from(octets), prefix),
            egress_nat: raw.egress_nat,
        })
    }
}

impl From<&ManifestFacts> for RawFacts {
    fn from(f: &ManifestFacts) -> Self {
        Self {
            build_uuid: Some(f.build_uuid.to_vec()),
            bridge_ipv4: Some(f.bridge.addr.octets().to_vec()),
            prefix: Some(f.bridge.prefix),
            egress_nat: f.egress_nat,
        }
    }
}

impl From<ManifestFacts> for RawFacts {
    fn from(f: ManifestFacts) -> Self {
        Self::from(&f)
    }
}
