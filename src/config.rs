//! Stack configuration.
//!
//! The declaration is deterministic: the only enumerable inputs are the
//! target region and availability zone, the key pair name, the instance
//! size, and the CIDR literals. All of them default to the canonical
//! values; a YAML file can override them.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cidr::Cidr;
use crate::error::{Error, Result};

/// Inputs of the canonical network stack.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StackConfig {
    /// Target region
    pub region: String,
    /// Availability zone both subnets are placed in (the stack uses one)
    pub availability_zone: String,
    /// SSH key pair name for both instances
    pub key_name: String,
    /// Instance size class for both instances
    pub instance_type: String,
    /// VPC address block
    pub vpc_cidr: Cidr,
    /// Public subnet sub-block
    pub public_subnet_cidr: Cidr,
    /// Private subnet sub-block
    pub private_subnet_cidr: Cidr,
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            region: "us-east-1".to_string(),
            availability_zone: "us-east-1a".to_string(),
            key_name: "KPLegend1".to_string(),
            instance_type: "t2.micro".to_string(),
            vpc_cidr: Cidr::from_octets(10, 0, 0, 0, 24),
            public_subnet_cidr: Cidr::from_octets(10, 0, 0, 0, 26),
            private_subnet_cidr: Cidr::from_octets(10, 0, 0, 64, 26),
        }
    }
}

impl StackConfig {
    /// Loads the config from a YAML file, or the defaults when no path is
    /// given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        debug!(path = %path.display(), "loading stack config");
        let contents = std::fs::read_to_string(path).map_err(|e| Error::ConfigLoad {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        serde_yaml::from_str(&contents).map_err(|e| Error::ConfigLoad {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}
