//! Typed resource records for the network topology.
//!
//! Each record carries the fixed attributes of one cloud resource plus
//! references (by logical id) to the records it depends on. References are
//! plain names resolved during validation, so a dangling name is caught at
//! declaration time rather than at deployment time.

pub mod acl;
pub mod gateway;
pub mod instance;
pub mod routing;
pub mod security;
pub mod subnet;
pub mod vpc;

pub use acl::{AclDirection, AclEntry, NetworkAcl, PortRange, Protocol, RuleAction};
pub use gateway::{AddressDomain, ElasticIp, InternetGateway, NatGateway};
pub use instance::{Instance, MachineImage, UserData};
pub use routing::{Route, RouteTable, RouteTarget};
pub use security::{IngressRule, SecurityGroup};
pub use subnet::Subnet;
pub use vpc::Vpc;

use std::fmt;

use serde::{Deserialize, Serialize};

/// A reference to another resource by logical id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ref(String);

impl Ref {
    /// Creates a reference to the given logical id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The referenced logical id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Ref {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for Ref {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for Ref {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The kind of a declared resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    Vpc,
    Subnet,
    InternetGateway,
    ElasticIp,
    NatGateway,
    RouteTable,
    NetworkAcl,
    SecurityGroup,
    Instance,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::Vpc => "vpc",
            ResourceKind::Subnet => "subnet",
            ResourceKind::InternetGateway => "internet-gateway",
            ResourceKind::ElasticIp => "elastic-ip",
            ResourceKind::NatGateway => "nat-gateway",
            ResourceKind::RouteTable => "route-table",
            ResourceKind::NetworkAcl => "network-acl",
            ResourceKind::SecurityGroup => "security-group",
            ResourceKind::Instance => "instance",
        };
        f.write_str(name)
    }
}

/// A declared resource record.
///
/// The variants cover exactly the entity set of the topology data model;
/// route entries, ACL entries, and ingress rules are nested inside their
/// owning record rather than declared as top-level resources.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Resource {
    Vpc(Vpc),
    Subnet(Subnet),
    InternetGateway(InternetGateway),
    ElasticIp(ElasticIp),
    NatGateway(NatGateway),
    RouteTable(RouteTable),
    NetworkAcl(NetworkAcl),
    SecurityGroup(SecurityGroup),
    Instance(Instance),
}

impl Resource {
    /// The kind of this resource.
    pub fn kind(&self) -> ResourceKind {
        match self {
            Resource::Vpc(_) => ResourceKind::Vpc,
            Resource::Subnet(_) => ResourceKind::Subnet,
            Resource::InternetGateway(_) => ResourceKind::InternetGateway,
            Resource::ElasticIp(_) => ResourceKind::ElasticIp,
            Resource::NatGateway(_) => ResourceKind::NatGateway,
            Resource::RouteTable(_) => ResourceKind::RouteTable,
            Resource::NetworkAcl(_) => ResourceKind::NetworkAcl,
            Resource::SecurityGroup(_) => ResourceKind::SecurityGroup,
            Resource::Instance(_) => ResourceKind::Instance,
        }
    }

    /// Every outgoing reference together with the kind of record it must
    /// resolve to. This is both the validation contract and the source of
    /// the dependency edges that fix the creation order.
    pub fn references(&self) -> Vec<(ResourceKind, &Ref)> {
        match self {
            Resource::Vpc(_) | Resource::ElasticIp(_) => Vec::new(),
            Resource::Subnet(subnet) => vec![(ResourceKind::Vpc, &subnet.vpc)],
            Resource::InternetGateway(igw) => vec![(ResourceKind::Vpc, &igw.vpc)],
            Resource::NatGateway(nat) => vec![
                (ResourceKind::ElasticIp, &nat.allocation),
                (ResourceKind::Subnet, &nat.subnet),
            ],
            Resource::RouteTable(table) => {
                let mut refs = vec![(ResourceKind::Vpc, &table.vpc)];
                for route in &table.routes {
                    refs.push(match &route.target {
                        RouteTarget::InternetGateway(igw) => (ResourceKind::InternetGateway, igw),
                        RouteTarget::NatGateway(nat) => (ResourceKind::NatGateway, nat),
                    });
                }
                for subnet in &table.subnets {
                    refs.push((ResourceKind::Subnet, subnet));
                }
                refs
            }
            Resource::NetworkAcl(acl) => {
                let mut refs = vec![(ResourceKind::Vpc, &acl.vpc)];
                for subnet in &acl.subnets {
                    refs.push((ResourceKind::Subnet, subnet));
                }
                refs
            }
            Resource::SecurityGroup(group) => vec![(ResourceKind::Vpc, &group.vpc)],
            Resource::Instance(instance) => vec![
                (ResourceKind::Subnet, &instance.subnet),
                (ResourceKind::SecurityGroup, &instance.security_group),
            ],
        }
    }

    /// The display name tag, if one was set.
    pub fn name(&self) -> Option<&str> {
        let name = match self {
            Resource::Vpc(vpc) => &vpc.name,
            Resource::Subnet(subnet) => &subnet.name,
            Resource::InternetGateway(igw) => &igw.name,
            Resource::ElasticIp(eip) => &eip.name,
            Resource::NatGateway(nat) => &nat.name,
            Resource::RouteTable(table) => &table.name,
            Resource::NetworkAcl(acl) => &acl.name,
            Resource::SecurityGroup(group) => &group.name,
            Resource::Instance(instance) => &instance.name,
        };
        name.as_deref()
    }
}

macro_rules! impl_from_resource {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Resource {
                fn from(value: $ty) -> Self {
                    Resource::$variant(value)
                }
            }
        )*
    };
}

impl_from_resource! {
    Vpc => Vpc,
    Subnet => Subnet,
    InternetGateway => InternetGateway,
    ElasticIp => ElasticIp,
    NatGateway => NatGateway,
    RouteTable => RouteTable,
    NetworkAcl => NetworkAcl,
    SecurityGroup => SecurityGroup,
    Instance => Instance,
}
