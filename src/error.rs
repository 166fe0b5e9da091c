//! Error types for Stackform.
//!
//! Every failure a declaration can produce is raised at evaluation time,
//! before anything is handed to the provisioning engine. The two central
//! kinds are [`Error::UnresolvedReference`] and [`Error::InvalidContainment`];
//! the remaining variants cover graph construction and I/O around the CLI.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Stackform operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for Stackform.
#[derive(Error, Debug)]
pub enum Error {
    /// A named cross-reference does not exist in the topology, or names a
    /// record of the wrong kind.
    #[error("Unresolved reference in '{resource}': {message}")]
    UnresolvedReference {
        /// Logical id of the resource holding the dangling reference
        resource: String,
        /// Error message
        message: String,
    },

    /// A CIDR block is not contained within its claimed parent, or two
    /// sibling blocks overlap.
    #[error("Invalid containment for '{resource}': {message}")]
    InvalidContainment {
        /// Logical id of the offending resource
        resource: String,
        /// Error message
        message: String,
    },

    /// Two resources (or outputs) were declared under the same logical id.
    #[error("Duplicate logical id '{0}'")]
    DuplicateLogicalId(String),

    /// Two ACL entries in the same direction share a rule number, which
    /// would make the evaluation order ambiguous.
    #[error("Duplicate rule number {rule_number} in network ACL '{acl}' ({direction})")]
    DuplicateRuleNumber {
        /// Logical id of the network ACL
        acl: String,
        /// Direction the entries apply to
        direction: String,
        /// The colliding rule number
        rule_number: u16,
    },

    /// A NAT gateway was placed in a subnet that does not map public
    /// addresses.
    #[error(
        "NAT gateway '{nat}' must sit in a public subnet, but '{subnet}' does not map public addresses"
    )]
    NatGatewayPlacement {
        /// Logical id of the NAT gateway
        nat: String,
        /// Logical id of the referenced subnet
        subnet: String,
    },

    /// The reference graph contains a cycle, so no creation order exists.
    #[error("Dependency cycle among resources: {0}")]
    DependencyCycle(String),

    /// A CIDR string could not be parsed or is out of range.
    #[error("Invalid CIDR block '{cidr}': {message}")]
    InvalidCidr {
        /// The offending input
        cidr: String,
        /// Error message
        message: String,
    },

    /// Configuration file problem.
    #[error("Failed to load config from '{path}': {message}")]
    ConfigLoad {
        /// Path to the config file
        path: PathBuf,
        /// Error message
        message: String,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Creates a new unresolved reference error.
    pub fn unresolved_reference(resource: impl Into<String>, message: impl Into<String>) -> Self {
        Self::UnresolvedReference {
            resource: resource.into(),
            message: message.into(),
        }
    }

    /// Creates a new invalid containment error.
    pub fn invalid_containment(resource: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidContainment {
            resource: resource.into(),
            message: message.into(),
        }
    }

    /// Creates a new invalid CIDR error.
    pub fn invalid_cidr(cidr: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidCidr {
            cidr: cidr.into(),
            message: message.into(),
        }
    }

    /// Returns the error code for CLI exit status.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::UnresolvedReference { .. } => 2,
            Error::InvalidContainment { .. } | Error::InvalidCidr { .. } => 3,
            Error::DuplicateLogicalId(_)
            | Error::DuplicateRuleNumber { .. }
            | Error::NatGatewayPlacement { .. }
            | Error::DependencyCycle(_) => 4,
            Error::ConfigLoad { .. } => 5,
            _ => 1,
        }
    }
}
