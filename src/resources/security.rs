//! Security group records.
//!
//! Security groups are stateful allow-lists scoped to an instance: inbound
//! traffic is denied unless an ingress rule matches, return traffic is
//! always allowed, and outbound traffic is governed by the
//! `allow_all_outbound` flag.

use serde::{Deserialize, Serialize};

use crate::cidr::Cidr;
use crate::resources::acl::{PortRange, Protocol};
use crate::resources::Ref;

/// One inbound allow rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngressRule {
    /// Source block the rule matches
    pub peer: Cidr,
    /// Protocol the rule matches
    pub protocol: Protocol,
    /// Port range for port-aware protocols; `None` matches all ports
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port_range: Option<PortRange>,
    /// Human-readable rule description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl IngressRule {
    /// Allows TCP traffic to a single port from the given block.
    pub fn tcp(peer: Cidr, port: u16) -> Self {
        Self {
            peer,
            protocol: Protocol::Tcp,
            port_range: Some(PortRange::single(port)),
            description: None,
        }
    }

    /// Allows all protocols and ports from the given block.
    pub fn all_traffic(peer: Cidr) -> Self {
        Self {
            peer,
            protocol: Protocol::All,
            port_range: None,
            description: None,
        }
    }

    /// Sets the rule description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A stateful allow-list packet filter attached to instances.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityGroup {
    /// Parent VPC
    pub vpc: Ref,
    /// Description shown by the platform
    pub description: String,
    /// Whether all egress is allowed
    pub allow_all_outbound: bool,
    /// Inbound allow rules; everything not listed is denied
    #[serde(default)]
    pub ingress: Vec<IngressRule>,
    /// Display name tag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl SecurityGroup {
    /// Creates a group with no ingress rules and all egress allowed.
    pub fn new(vpc: impl Into<Ref>, description: impl Into<String>) -> Self {
        Self {
            vpc: vpc.into(),
            description: description.into(),
            allow_all_outbound: true,
            ingress: Vec::new(),
            name: None,
        }
    }

    /// Adds an ingress rule.
    pub fn with_ingress(mut self, rule: IngressRule) -> Self {
        self.ingress.push(rule);
        self
    }

    /// Sets the display name tag.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Returns true if some rule admits TCP traffic on `port` from `peer`.
    pub fn allows_tcp_from(&self, peer: &Cidr, port: u16) -> bool {
        self.ingress.iter().any(|rule| {
            rule.peer.contains(peer)
                && match rule.protocol {
                    Protocol::All => true,
                    Protocol::Tcp => rule.port_range.is_none_or(|range| range.covers(port)),
                    _ => false,
                }
        })
    }
}
