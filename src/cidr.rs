//! IPv4 CIDR blocks with containment and overlap checks.
//!
//! Containment is what makes the topology checkable before deployment: a
//! subnet block must sit inside its parent network block, and sibling
//! subnets must not overlap. Both checks reduce to masked prefix
//! comparisons on the network address.

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

/// An IPv4 CIDR block such as `10.0.0.0/24`.
///
/// Comparison and containment operate on the network address (the host
/// bits of `addr` are masked off), so `10.0.0.5/24` and `10.0.0.0/24`
/// denote the same block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cidr {
    addr: Ipv4Addr,
    prefix: u8,
}

impl Cidr {
    /// The match-everything block `0.0.0.0/0`, used for default routes and
    /// open ingress rules.
    pub const ANY: Cidr = Cidr {
        addr: Ipv4Addr::UNSPECIFIED,
        prefix: 0,
    };

    /// Creates a CIDR block, rejecting prefixes longer than 32 bits.
    pub fn new(addr: Ipv4Addr, prefix: u8) -> Result<Self> {
        if prefix > 32 {
            return Err(Error::invalid_cidr(
                format!("{addr}/{prefix}"),
                "prefix length must be between 0 and 32",
            ));
        }
        Ok(Self { addr, prefix })
    }

    /// Creates a CIDR block from literal octets.
    ///
    /// Intended for compile-time constants; `prefix` must be at most 32 or
    /// later mask arithmetic will misbehave.
    pub const fn from_octets(a: u8, b: u8, c: u8, d: u8, prefix: u8) -> Self {
        Self {
            addr: Ipv4Addr::new(a, b, c, d),
            prefix,
        }
    }

    /// The prefix length.
    pub fn prefix(&self) -> u8 {
        self.prefix
    }

    /// The network address with host bits cleared.
    pub fn network(&self) -> Ipv4Addr {
        Ipv4Addr::from(u32::from(self.addr) & self.mask())
    }

    /// Number of addresses covered by the block.
    pub fn address_count(&self) -> u64 {
        1u64 << (32 - u32::from(self.prefix))
    }

    /// Returns true if `other` is a sub-block of (or equal to) this block.
    pub fn contains(&self, other: &Cidr) -> bool {
        other.prefix >= self.prefix
            && (u32::from(other.addr) & self.mask()) == (u32::from(self.addr) & self.mask())
    }

    /// Returns true if the two blocks share any address.
    pub fn overlaps(&self, other: &Cidr) -> bool {
        self.contains(other) || other.contains(self)
    }

    fn mask(&self) -> u32 {
        if self.prefix == 0 {
            0
        } else {
            u32::MAX << (32 - u32::from(self.prefix))
        }
    }
}

impl fmt::Display for Cidr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network(), self.prefix)
    }
}

impl FromStr for Cidr {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (addr, prefix) = s
            .split_once('/')
            .ok_or_else(|| Error::invalid_cidr(s, "expected 'a.b.c.d/prefix'"))?;
        let addr: Ipv4Addr = addr
            .parse()
            .map_err(|e| Error::invalid_cidr(s, format!("bad address: {e}")))?;
        let prefix: u8 = prefix
            .parse()
            .map_err(|e| Error::invalid_cidr(s, format!("bad prefix length: {e}")))?;
        Self::new(addr, prefix)
    }
}

impl Serialize for Cidr {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Cidr {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cidr(s: &str) -> Cidr {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_and_display() {
        let block = cidr("10.0.0.0/24");
        assert_eq!(block.prefix(), 24);
        assert_eq!(block.to_string(), "10.0.0.0/24");
        assert_eq!(block.address_count(), 256);
    }

    #[test]
    fn test_host_bits_are_masked() {
        assert_eq!(cidr("10.0.0.5/24").network(), cidr("10.0.0.0/24").network());
        assert_eq!(cidr("10.0.0.5/24").to_string(), "10.0.0.0/24");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("10.0.0.0".parse::<Cidr>().is_err());
        assert!("10.0.0/24".parse::<Cidr>().is_err());
        assert!("10.0.0.0/33".parse::<Cidr>().is_err());
        assert!("10.0.0.0/x".parse::<Cidr>().is_err());
    }

    #[test]
    fn test_containment() {
        let vpc = cidr("10.0.0.0/24");
        assert!(vpc.contains(&cidr("10.0.0.0/26")));
        assert!(vpc.contains(&cidr("10.0.0.64/26")));
        assert!(vpc.contains(&vpc));
        assert!(!vpc.contains(&cidr("10.0.1.0/26")));
        assert!(!cidr("10.0.0.0/26").contains(&vpc));
    }

    #[test]
    fn test_sibling_subnets_are_disjoint() {
        let public = cidr("10.0.0.0/26");
        let private = cidr("10.0.0.64/26");
        assert!(!public.overlaps(&private));
        assert!(public.overlaps(&cidr("10.0.0.32/27")));
    }

    #[test]
    fn test_any_contains_everything() {
        assert!(Cidr::ANY.contains(&cidr("203.0.113.0/24")));
        assert_eq!(Cidr::ANY.to_string(), "0.0.0.0/0");
    }

    #[test]
    fn test_serde_round_trip() {
        let block = cidr("10.0.0.64/26");
        let json = serde_json::to_string(&block).unwrap();
        assert_eq!(json, "\"10.0.0.64/26\"");
        let back: Cidr = serde_json::from_str(&json).unwrap();
        assert_eq!(back, block);
    }
}
