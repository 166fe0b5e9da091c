//! Gateway records: internet gateway, elastic address, NAT gateway.

use serde::{Deserialize, Serialize};

use crate::resources::Ref;

/// Enables direct internet reachability for one VPC.
///
/// The attachment relation of the underlying platform is folded into the
/// `vpc` reference; declaring the gateway implies attaching it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InternetGateway {
    /// VPC the gateway is attached to
    pub vpc: Ref,
    /// Display name tag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl InternetGateway {
    /// Creates an internet gateway attached to the given VPC.
    pub fn new(vpc: impl Into<Ref>) -> Self {
        Self {
            vpc: vpc.into(),
            name: None,
        }
    }

    /// Sets the display name tag.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Scope of a reserved public address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressDomain {
    /// Address reserved for use inside a VPC
    Vpc,
}

/// A reserved public address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElasticIp {
    /// Address scope
    pub domain: AddressDomain,
    /// Display name tag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ElasticIp {
    /// Creates a VPC-scoped elastic address.
    pub fn new() -> Self {
        Self {
            domain: AddressDomain::Vpc,
            name: None,
        }
    }

    /// Sets the display name tag.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl Default for ElasticIp {
    fn default() -> Self {
        Self::new()
    }
}

/// Outbound-only internet access for private resources.
///
/// Must sit in a public subnet; validation rejects placements in subnets
/// that do not map public addresses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NatGateway {
    /// Elastic address the gateway uses
    pub allocation: Ref,
    /// Subnet the gateway is placed in
    pub subnet: Ref,
    /// Display name tag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl NatGateway {
    /// Creates a NAT gateway backed by the given elastic address.
    pub fn new(allocation: impl Into<Ref>, subnet: impl Into<Ref>) -> Self {
        Self {
            allocation: allocation.into(),
            subnet: subnet.into(),
            name: None,
        }
    }

    /// Sets the display name tag.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}
