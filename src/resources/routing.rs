//! Route table records.

use serde::{Deserialize, Serialize};

use crate::cidr::Cidr;
use crate::resources::Ref;

/// Where a route sends matching traffic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteTarget {
    /// Direct internet egress through an internet gateway
    InternetGateway(Ref),
    /// Outbound-only egress through a NAT gateway
    NatGateway(Ref),
}

impl RouteTarget {
    /// The referenced gateway, regardless of its kind.
    pub fn gateway(&self) -> &Ref {
        match self {
            RouteTarget::InternetGateway(r) | RouteTarget::NatGateway(r) => r,
        }
    }
}

/// A destination-to-target mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    /// Destination block the route matches
    pub destination: Cidr,
    /// Target gateway
    pub target: RouteTarget,
}

impl Route {
    /// Creates a route.
    pub fn new(destination: Cidr, target: RouteTarget) -> Self {
        Self {
            destination,
            target,
        }
    }

    /// Returns true if this is the default route (`0.0.0.0/0`).
    pub fn is_default(&self) -> bool {
        self.destination == Cidr::ANY
    }
}

/// Controls traffic egress from its associated subnets.
///
/// Routes and subnet associations are entries of the table rather than
/// standalone resources; each subnet in `subnets` is associated with
/// exactly this table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteTable {
    /// Parent VPC
    pub vpc: Ref,
    /// Route entries
    #[serde(default)]
    pub routes: Vec<Route>,
    /// Associated subnets
    #[serde(default)]
    pub subnets: Vec<Ref>,
    /// Display name tag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl RouteTable {
    /// Creates an empty route table in the given VPC.
    pub fn new(vpc: impl Into<Ref>) -> Self {
        Self {
            vpc: vpc.into(),
            routes: Vec::new(),
            subnets: Vec::new(),
            name: None,
        }
    }

    /// Adds a route entry.
    pub fn with_route(mut self, destination: Cidr, target: RouteTarget) -> Self {
        self.routes.push(Route::new(destination, target));
        self
    }

    /// Adds a default route (`0.0.0.0/0`) to the given target.
    pub fn with_default_route(self, target: RouteTarget) -> Self {
        self.with_route(Cidr::ANY, target)
    }

    /// Associates a subnet with this table.
    pub fn with_subnet(mut self, subnet: impl Into<Ref>) -> Self {
        self.subnets.push(subnet.into());
        self
    }

    /// Sets the display name tag.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// The default routes of this table. A well-formed table has exactly
    /// one.
    pub fn default_routes(&self) -> Vec<&Route> {
        self.routes.iter().filter(|r| r.is_default()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_route_detection() {
        let table = RouteTable::new("Vpc")
            .with_route(
                Cidr::from_octets(10, 1, 0, 0, 16),
                RouteTarget::InternetGateway(Ref::new("Igw")),
            )
            .with_default_route(RouteTarget::NatGateway(Ref::new("Nat")));

        let defaults = table.default_routes();
        assert_eq!(defaults.len(), 1);
        assert_eq!(
            defaults[0].target,
            RouteTarget::NatGateway(Ref::new("Nat"))
        );
    }
}
