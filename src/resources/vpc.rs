//! The virtual network (VPC) record.

use serde::{Deserialize, Serialize};

use crate::cidr::Cidr;

/// An isolated virtual address space for cloud resources.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vpc {
    /// Address block for the whole network
    pub cidr: Cidr,
    /// Whether DNS resolution is enabled
    pub enable_dns_support: bool,
    /// Whether instances receive DNS hostnames
    pub enable_dns_hostnames: bool,
    /// Display name tag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Vpc {
    /// Creates a VPC with both DNS flags enabled.
    pub fn new(cidr: Cidr) -> Self {
        Self {
            cidr,
            enable_dns_support: true,
            enable_dns_hostnames: true,
            name: None,
        }
    }

    /// Sets the display name tag.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets both DNS flags.
    pub fn with_dns(mut self, support: bool, hostnames: bool) -> Self {
        self.enable_dns_support = support;
        self.enable_dns_hostnames = hostnames;
        self
    }
}
