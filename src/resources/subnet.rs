//! Subnet records.

use serde::{Deserialize, Serialize};

use crate::cidr::Cidr;
use crate::resources::Ref;

/// A sub-range of a VPC's address space bound to one availability zone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subnet {
    /// Parent VPC
    pub vpc: Ref,
    /// Address sub-block, validated to sit inside the parent block
    pub cidr: Cidr,
    /// Availability zone the subnet lives in
    pub availability_zone: String,
    /// Whether launched instances receive a public address
    pub map_public_ip_on_launch: bool,
    /// Display name tag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Subnet {
    /// Creates a private subnet (no public addresses on launch).
    pub fn new(vpc: impl Into<Ref>, cidr: Cidr, availability_zone: impl Into<String>) -> Self {
        Self {
            vpc: vpc.into(),
            cidr,
            availability_zone: availability_zone.into(),
            map_public_ip_on_launch: false,
            name: None,
        }
    }

    /// Marks the subnet public: instances launched into it get a public
    /// address, and a NAT gateway may be placed here.
    pub fn public(mut self) -> Self {
        self.map_public_ip_on_launch = true;
        self
    }

    /// Sets the display name tag.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}
