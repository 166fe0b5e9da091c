//! Network ACL records.
//!
//! ACLs are stateless, ordered packet filters. Entries are evaluated in
//! ascending rule-number order within each direction, and the first match
//! wins, so rule numbers must be unique per direction.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::cidr::Cidr;
use crate::resources::Ref;

/// IP protocol selector, serialized as the platform's numeric code
/// (`-1` means all protocols).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    /// All protocols (`-1`)
    All,
    /// ICMP (`1`)
    Icmp,
    /// TCP (`6`)
    Tcp,
    /// UDP (`17`)
    Udp,
    /// Any other protocol number
    Number(i32),
}

impl Protocol {
    /// The numeric protocol code.
    pub fn number(&self) -> i32 {
        match self {
            Protocol::All => -1,
            Protocol::Icmp => 1,
            Protocol::Tcp => 6,
            Protocol::Udp => 17,
            Protocol::Number(n) => *n,
        }
    }

    /// Maps a numeric code back to a protocol.
    pub fn from_number(n: i32) -> Self {
        match n {
            -1 => Protocol::All,
            1 => Protocol::Icmp,
            6 => Protocol::Tcp,
            17 => Protocol::Udp,
            other => Protocol::Number(other),
        }
    }
}

impl Serialize for Protocol {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i32(self.number())
    }
}

impl<'de> Deserialize<'de> for Protocol {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Protocol::from_number(i32::deserialize(deserializer)?))
    }
}

/// Whether an entry allows or denies matching traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleAction {
    Allow,
    Deny,
}

/// Traffic direction an entry applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AclDirection {
    /// Traffic entering the subnet
    Ingress,
    /// Traffic leaving the subnet
    Egress,
}

impl fmt::Display for AclDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AclDirection::Ingress => f.write_str("ingress"),
            AclDirection::Egress => f.write_str("egress"),
        }
    }
}

/// An inclusive port range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortRange {
    /// First port of the range
    pub from: u16,
    /// Last port of the range
    pub to: u16,
}

impl PortRange {
    /// Creates a range covering `from..=to`.
    pub fn new(from: u16, to: u16) -> Self {
        Self { from, to }
    }

    /// Creates a single-port range.
    pub fn single(port: u16) -> Self {
        Self {
            from: port,
            to: port,
        }
    }

    /// Returns true if the range covers the given port.
    pub fn covers(&self, port: u16) -> bool {
        (self.from..=self.to).contains(&port)
    }
}

impl fmt::Display for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.from == self.to {
            write!(f, "{}", self.from)
        } else {
            write!(f, "{}-{}", self.from, self.to)
        }
    }
}

/// One ordered filter entry of a network ACL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AclEntry {
    /// Evaluation position; lower numbers are evaluated first
    pub rule_number: u16,
    /// Protocol the entry matches
    pub protocol: Protocol,
    /// Allow or deny
    pub action: RuleAction,
    /// Source (ingress) or destination (egress) block
    pub cidr: Cidr,
    /// Optional port range for port-aware protocols
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port_range: Option<PortRange>,
    /// Direction the entry applies to
    pub direction: AclDirection,
}

impl AclEntry {
    /// Creates an ingress entry.
    pub fn ingress(rule_number: u16, protocol: Protocol, action: RuleAction, cidr: Cidr) -> Self {
        Self {
            rule_number,
            protocol,
            action,
            cidr,
            port_range: None,
            direction: AclDirection::Ingress,
        }
    }

    /// Creates an egress entry.
    pub fn egress(rule_number: u16, protocol: Protocol, action: RuleAction, cidr: Cidr) -> Self {
        Self {
            direction: AclDirection::Egress,
            ..Self::ingress(rule_number, protocol, action, cidr)
        }
    }

    /// Restricts the entry to a port range.
    pub fn with_ports(mut self, from: u16, to: u16) -> Self {
        self.port_range = Some(PortRange::new(from, to));
        self
    }
}

/// A stateless, ordered allow/deny packet filter scoped to its associated
/// subnets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkAcl {
    /// Parent VPC
    pub vpc: Ref,
    /// Filter entries, both directions
    #[serde(default)]
    pub entries: Vec<AclEntry>,
    /// Associated subnets
    #[serde(default)]
    pub subnets: Vec<Ref>,
    /// Display name tag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl NetworkAcl {
    /// Creates an empty ACL in the given VPC.
    pub fn new(vpc: impl Into<Ref>) -> Self {
        Self {
            vpc: vpc.into(),
            entries: Vec::new(),
            subnets: Vec::new(),
            name: None,
        }
    }

    /// Adds a filter entry.
    pub fn with_entry(mut self, entry: AclEntry) -> Self {
        self.entries.push(entry);
        self
    }

    /// Associates a subnet with this ACL.
    pub fn with_subnet(mut self, subnet: impl Into<Ref>) -> Self {
        self.subnets.push(subnet.into());
        self
    }

    /// Sets the display name tag.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Entries for one direction in evaluation order (ascending rule
    /// number).
    pub fn entries_in_order(&self, direction: AclDirection) -> Vec<&AclEntry> {
        let mut entries: Vec<&AclEntry> = self
            .entries
            .iter()
            .filter(|e| e.direction == direction)
            .collect();
        entries.sort_by_key(|e| e.rule_number);
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_numbers_round_trip() {
        for protocol in [
            Protocol::All,
            Protocol::Icmp,
            Protocol::Tcp,
            Protocol::Udp,
            Protocol::Number(47),
        ] {
            assert_eq!(Protocol::from_number(protocol.number()), protocol);
        }
        assert_eq!(Protocol::All.number(), -1);
    }

    #[test]
    fn test_entries_in_order_sorts_by_rule_number() {
        let acl = NetworkAcl::new("Vpc")
            .with_entry(
                AclEntry::ingress(110, Protocol::Tcp, RuleAction::Allow, Cidr::ANY)
                    .with_ports(1024, 65535),
            )
            .with_entry(AclEntry::ingress(
                100,
                Protocol::All,
                RuleAction::Allow,
                Cidr::ANY,
            ))
            .with_entry(AclEntry::egress(
                100,
                Protocol::All,
                RuleAction::Allow,
                Cidr::ANY,
            ));

        let ingress = acl.entries_in_order(AclDirection::Ingress);
        assert_eq!(
            ingress.iter().map(|e| e.rule_number).collect::<Vec<_>>(),
            vec![100, 110]
        );
        assert_eq!(acl.entries_in_order(AclDirection::Egress).len(), 1);
    }

    #[test]
    fn test_port_range_display() {
        assert_eq!(PortRange::single(22).to_string(), "22");
        assert_eq!(PortRange::new(1024, 65535).to_string(), "1024-65535");
        assert!(PortRange::new(1024, 65535).covers(8080));
        assert!(!PortRange::new(1024, 65535).covers(80));
    }
}
