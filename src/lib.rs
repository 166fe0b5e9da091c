//! # Stackform - A Declarative Network Topology Synthesizer
//!
//! Stackform models a fixed cloud network topology as an explicit,
//! validated DAG of named resource records instead of a sequence of
//! provisioning calls with side effects. The declaration is evaluated
//! once, synchronously, and deterministically; every failure a topology
//! can produce is raised at evaluation time, before anything reaches the
//! external provisioning engine.
//!
//! ## Core Concepts
//!
//! - **Resources**: typed records (VPC, subnets, gateways, route tables,
//!   network ACLs, security groups, instances) keyed by logical id
//! - **References**: cross-references by logical id, resolved during
//!   validation - a dangling name aborts evaluation
//! - **Topology**: the ordered resource graph plus published outputs
//! - **Validation**: reference resolution, CIDR containment and overlap,
//!   ACL rule numbering, NAT gateway placement
//! - **Synthesis**: the provisioning document, resources in creation
//!   order plus outputs, rendered as JSON or YAML
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                  Stack Declaration                    │
//! │        (fixed literals + StackConfig inputs)          │
//! └──────────────────────────────────────────────────────┘
//!                          │
//!                          ▼
//! ┌──────────────────────────────────────────────────────┐
//! │                      Topology                         │
//! │     (named records, reference-derived dependency      │
//! │                DAG via petgraph)                      │
//! └──────────────────────────────────────────────────────┘
//!                          │
//!               validate() │ deployment_order()
//!                          ▼
//! ┌──────────────────────────────────────────────────────┐
//! │                      Manifest                         │
//! │   (provisioning document consumed by the external     │
//! │                 deployment engine)                    │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Example
//!
//! ```rust
//! use stackform::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let config = StackConfig::default();
//!     let topology = network_stack(&config)?;
//!     let manifest = synthesize(&topology)?;
//!     println!("{}", manifest.to_json()?);
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Re-export commonly used items in prelude
pub mod prelude {
    //! Convenient re-exports of commonly used types.

    pub use crate::cidr::Cidr;
    pub use crate::config::StackConfig;
    pub use crate::error::{Error, Result};
    pub use crate::graph::{Output, OutputValue, Topology};
    pub use crate::resources::{
        AclDirection, AclEntry, ElasticIp, IngressRule, Instance, InternetGateway, MachineImage,
        NatGateway, NetworkAcl, PortRange, Protocol, Ref, Resource, ResourceKind, Route,
        RouteTable, RouteTarget, RuleAction, SecurityGroup, Subnet, UserData, Vpc,
    };
    pub use crate::stack::network_stack;
    pub use crate::synth::{synthesize, Manifest};
}

/// Error types and result aliases for Stackform operations.
pub mod error;

/// IPv4 CIDR blocks with containment and overlap checks.
pub mod cidr;

/// Typed resource records for the network topology.
pub mod resources;

/// The topology graph: named records, dependency DAG, deployment order.
pub mod graph;

/// Declaration-time validation of the topology graph.
pub mod validate;

/// Synthesis of the provisioning document.
pub mod synth;

/// The canonical network stack declaration.
pub mod stack;

/// Stack configuration: the enumerable inputs of the declaration.
pub mod config;

/// Returns the current version of Stackform.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
