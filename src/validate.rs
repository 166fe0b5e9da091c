//! Declaration-time validation of the topology graph.
//!
//! Runs before synthesis and before anything reaches the provisioning
//! engine. The checks, in order:
//!
//! 1. Every cross-reference resolves to an existing record of the
//!    expected kind (else [`Error::UnresolvedReference`]).
//! 2. Every subnet block is contained in its VPC block, and sibling
//!    subnets of the same VPC are disjoint (else
//!    [`Error::InvalidContainment`]).
//! 3. ACL rule numbers are unique per ACL and direction.
//! 4. Every NAT gateway sits in a subnet that maps public addresses.

use std::collections::HashSet;

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::graph::Topology;
use crate::resources::{Resource, Subnet};

/// Validates the whole graph. Called by [`Topology::validate`].
pub fn validate(topology: &Topology) -> Result<()> {
    check_references(topology)?;
    check_containment(topology)?;
    check_acl_rule_numbers(topology)?;
    check_nat_placement(topology)?;
    info!(resources = topology.len(), "topology validated");
    Ok(())
}

/// Every reference must name an existing record of the expected kind.
/// Output references must resolve too, to any kind.
fn check_references(topology: &Topology) -> Result<()> {
    for (id, resource) in topology.iter() {
        for (expected, reference) in resource.references() {
            match topology.get(reference.as_str()) {
                None => {
                    return Err(Error::unresolved_reference(
                        id,
                        format!("'{reference}' ({expected}) does not exist in the topology"),
                    ))
                }
                Some(target) if target.kind() != expected => {
                    return Err(Error::unresolved_reference(
                        id,
                        format!(
                            "'{reference}' is a {}, expected a {expected}",
                            target.kind()
                        ),
                    ))
                }
                Some(_) => {}
            }
        }
        debug!(id = %id, "references resolved");
    }
    for (name, output) in topology.outputs() {
        let reference = output.value.resource();
        if topology.get(reference.as_str()).is_none() {
            return Err(Error::unresolved_reference(
                format!("output '{name}'"),
                format!("'{reference}' does not exist in the topology"),
            ));
        }
    }
    Ok(())
}

/// Subnet blocks must nest inside their VPC block, and siblings must not
/// overlap.
fn check_containment(topology: &Topology) -> Result<()> {
    let subnets: Vec<(&str, &Subnet)> = topology
        .iter()
        .filter_map(|(id, r)| match r {
            Resource::Subnet(subnet) => Some((id, subnet)),
            _ => None,
        })
        .collect();

    for (id, subnet) in &subnets {
        let Some(Resource::Vpc(vpc)) = topology.get(subnet.vpc.as_str()) else {
            // caught by check_references
            continue;
        };
        if !vpc.cidr.contains(&subnet.cidr) {
            return Err(Error::invalid_containment(
                *id,
                format!(
                    "subnet block {} is not inside the VPC block {}",
                    subnet.cidr, vpc.cidr
                ),
            ));
        }
    }

    for (i, (id_a, subnet_a)) in subnets.iter().enumerate() {
        for (id_b, subnet_b) in &subnets[i + 1..] {
            if subnet_a.vpc == subnet_b.vpc && subnet_a.cidr.overlaps(&subnet_b.cidr) {
                return Err(Error::invalid_containment(
                    *id_a,
                    format!(
                        "subnet block {} overlaps sibling '{}' ({})",
                        subnet_a.cidr, id_b, subnet_b.cidr
                    ),
                ));
            }
        }
    }
    Ok(())
}

/// Rule numbers fix the evaluation order, so they must be unique within
/// one ACL and direction.
fn check_acl_rule_numbers(topology: &Topology) -> Result<()> {
    for (id, resource) in topology.iter() {
        let Resource::NetworkAcl(acl) = resource else {
            continue;
        };
        let mut seen = HashSet::new();
        for entry in &acl.entries {
            if !seen.insert((entry.direction, entry.rule_number)) {
                return Err(Error::DuplicateRuleNumber {
                    acl: id.to_string(),
                    direction: entry.direction.to_string(),
                    rule_number: entry.rule_number,
                });
            }
        }
    }
    Ok(())
}

/// A NAT gateway needs a public address, so its subnet must map one.
fn check_nat_placement(topology: &Topology) -> Result<()> {
    for (id, resource) in topology.iter() {
        let Resource::NatGateway(nat) = resource else {
            continue;
        };
        if let Some(Resource::Subnet(subnet)) = topology.get(nat.subnet.as_str()) {
            if !subnet.map_public_ip_on_launch {
                return Err(Error::NatGatewayPlacement {
                    nat: id.to_string(),
                    subnet: nat.subnet.to_string(),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cidr::Cidr;
    use crate::resources::{
        AclEntry, ElasticIp, NatGateway, NetworkAcl, Protocol, RouteTable, RuleAction, Vpc,
    };

    const AZ: &str = "us-east-1a";

    fn base() -> (Topology, crate::resources::Ref) {
        let mut topology = Topology::new();
        let vpc = topology
            .add("Vpc", Vpc::new(Cidr::from_octets(10, 0, 0, 0, 24)))
            .unwrap();
        (topology, vpc)
    }

    #[test]
    fn test_subnet_outside_vpc_block_is_invalid_containment() {
        let (mut topology, vpc) = base();
        topology
            .add(
                "Stray",
                Subnet::new(vpc, Cidr::from_octets(10, 0, 1, 0, 26), AZ),
            )
            .unwrap();
        let err = topology.validate().unwrap_err();
        assert!(matches!(err, Error::InvalidContainment { resource, .. } if resource == "Stray"));
    }

    #[test]
    fn test_overlapping_siblings_are_invalid_containment() {
        let (mut topology, vpc) = base();
        topology
            .add(
                "A",
                Subnet::new(vpc.clone(), Cidr::from_octets(10, 0, 0, 0, 26), AZ),
            )
            .unwrap();
        topology
            .add(
                "B",
                Subnet::new(vpc, Cidr::from_octets(10, 0, 0, 32, 27), AZ),
            )
            .unwrap();
        let err = topology.validate().unwrap_err();
        assert!(matches!(err, Error::InvalidContainment { .. }));
    }

    #[test]
    fn test_association_to_missing_subnet_is_unresolved() {
        let (mut topology, vpc) = base();
        topology
            .add("Table", RouteTable::new(vpc).with_subnet("NoSuchSubnet"))
            .unwrap();
        let err = topology.validate().unwrap_err();
        assert!(matches!(err, Error::UnresolvedReference { resource, .. } if resource == "Table"));
    }

    #[test]
    fn test_reference_to_wrong_kind_is_unresolved() {
        let (mut topology, vpc) = base();
        // a route table is not a subnet
        let table = topology.add("Table", RouteTable::new(vpc.clone())).unwrap();
        let eip = topology.add("Eip", ElasticIp::new()).unwrap();
        topology.add("Nat", NatGateway::new(eip, table)).unwrap();
        let err = topology.validate().unwrap_err();
        assert!(matches!(err, Error::UnresolvedReference { resource, .. } if resource == "Nat"));
    }

    #[test]
    fn test_duplicate_rule_numbers_rejected_per_direction() {
        let (mut topology, vpc) = base();
        topology
            .add(
                "Acl",
                NetworkAcl::new(vpc)
                    .with_entry(AclEntry::ingress(
                        100,
                        Protocol::All,
                        RuleAction::Allow,
                        Cidr::ANY,
                    ))
                    .with_entry(AclEntry::ingress(
                        100,
                        Protocol::Tcp,
                        RuleAction::Deny,
                        Cidr::ANY,
                    )),
            )
            .unwrap();
        let err = topology.validate().unwrap_err();
        assert!(matches!(err, Error::DuplicateRuleNumber { rule_number: 100, .. }));
    }

    #[test]
    fn test_same_rule_number_in_both_directions_is_fine() {
        let (mut topology, vpc) = base();
        topology
            .add(
                "Acl",
                NetworkAcl::new(vpc)
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
                    )),
            )
            .unwrap();
        assert!(topology.validate().is_ok());
    }

    #[test]
    fn test_nat_in_private_subnet_rejected() {
        let (mut topology, vpc) = base();
        let private = topology
            .add(
                "Private",
                Subnet::new(vpc, Cidr::from_octets(10, 0, 0, 64, 26), AZ),
            )
            .unwrap();
        let eip = topology.add("Eip", ElasticIp::new()).unwrap();
        topology.add("Nat", NatGateway::new(eip, private)).unwrap();
        let err = topology.validate().unwrap_err();
        assert!(matches!(err, Error::NatGatewayPlacement { .. }));
    }
}
