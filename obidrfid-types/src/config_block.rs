//! LAN configuration block
//!
//! The reader keeps its network settings in a 14-byte configuration block.
//! Only the first four bytes are interpreted here: they hold the IPv4 address
//! in dotted-octet order. Bytes 4..14 are reader-defined and must be written
//! back exactly as they were read.

use std::fmt;
use std::net::Ipv4Addr;

use crate::error::{Error, Result};

/// Snapshot of the reader's LAN configuration block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConfigBlock {
    bytes: [u8; ConfigBlock::SIZE],
}

impl ConfigBlock {
    /// Block size in bytes
    pub const SIZE: usize = 14;

    /// Offset of the first IP octet
    pub const IP_OFFSET: usize = 0;

    /// Number of IP octets
    pub const IP_LEN: usize = 4;

    pub fn new(bytes: [u8; Self::SIZE]) -> Self {
        Self { bytes }
    }

    /// Build a block from a slice that must be exactly 14 bytes
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for any other length.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let bytes: [u8; Self::SIZE] = bytes.try_into().map_err(|_| {
            Error::Validation(format!(
                "configuration block must be {} bytes, got {}",
                Self::SIZE,
                bytes.len()
            ))
        })?;

        Ok(Self { bytes })
    }

    pub fn as_bytes(&self) -> &[u8; Self::SIZE] {
        &self.bytes
    }

    /// IPv4 address stored at offsets 0..4
    pub fn ip(&self) -> Ipv4Addr {
        let o = &self.bytes[Self::IP_OFFSET..Self::IP_OFFSET + Self::IP_LEN];
        Ipv4Addr::new(o[0], o[1], o[2], o[3])
    }

    /// Replace the IP octets, leaving bytes 4..14 untouched
    pub fn set_ip(&mut self, ip: Ipv4Addr) {
        self.bytes[Self::IP_OFFSET..Self::IP_OFFSET + Self::IP_LEN].copy_from_slice(&ip.octets());
    }

    /// Copy of this block carrying `ip`
    pub fn with_ip(mut self, ip: Ipv4Addr) -> Self {
        self.set_ip(ip);
        self
    }

    /// Reader-defined trailing bytes (offsets 4..14)
    pub fn reserved(&self) -> &[u8] {
        &self.bytes[Self::IP_OFFSET + Self::IP_LEN..]
    }
}

impl TryFrom<&[u8]> for ConfigBlock {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        Self::from_slice(bytes)
    }
}

impl AsRef<[u8]> for ConfigBlock {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Display for ConfigBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ConfigBlock[ip: {}, rest: {:02X?}]", self.ip(), self.reserved())
    }
}
