//! The topology graph: named resource records plus published outputs.
//!
//! A [`Topology`] is an ordered map of logical id to [`Resource`]. Every
//! cross-reference is a logical id, so the reference direction of the
//! records induces a dependency DAG; [`Topology::deployment_order`]
//! linearizes it into the creation order the provisioning engine must
//! respect.

use indexmap::IndexMap;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use tracing::debug;

use crate::error::{Error, Result};
use crate::resources::{Ref, Resource};
use crate::validate;

/// Value published by an output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputValue {
    /// The platform identifier of a resource
    Id(Ref),
    /// A runtime attribute of a resource, e.g. the public address of an
    /// instance
    Attribute {
        /// Resource the attribute belongs to
        resource: Ref,
        /// Attribute name as the provisioning engine exposes it
        attribute: String,
    },
}

impl OutputValue {
    /// The resource the output reads from.
    pub fn resource(&self) -> &Ref {
        match self {
            OutputValue::Id(r) => r,
            OutputValue::Attribute { resource, .. } => resource,
        }
    }
}

/// A value read by operators or external tooling after deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Output {
    /// What the output publishes
    pub value: OutputValue,
    /// Human-readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Output {
    /// Publishes the identifier of a resource.
    pub fn id(resource: impl Into<Ref>) -> Self {
        Self {
            value: OutputValue::Id(resource.into()),
            description: None,
        }
    }

    /// Publishes a runtime attribute of a resource.
    pub fn attribute(resource: impl Into<Ref>, attribute: impl Into<String>) -> Self {
        Self {
            value: OutputValue::Attribute {
                resource: resource.into(),
                attribute: attribute.into(),
            },
            description: None,
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// The declared resource graph.
///
/// Insertion order is preserved and, together with the dependency edges,
/// makes [`Topology::deployment_order`] deterministic.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Topology {
    resources: IndexMap<String, Resource>,
    outputs: IndexMap<String, Output>,
}

impl Topology {
    /// Creates an empty topology.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a resource under a logical id, returning a [`Ref`] to it
    /// for wiring into later records.
    pub fn add(&mut self, id: impl Into<String>, resource: impl Into<Resource>) -> Result<Ref> {
        let id = id.into();
        if self.resources.contains_key(&id) {
            return Err(Error::DuplicateLogicalId(id));
        }
        let resource = resource.into();
        debug!(id = %id, kind = %resource.kind(), "declared resource");
        self.resources.insert(id.clone(), resource);
        Ok(Ref::new(id))
    }

    /// Publishes an output under a name.
    pub fn add_output(&mut self, name: impl Into<String>, output: Output) -> Result<()> {
        let name = name.into();
        if self.outputs.contains_key(&name) {
            return Err(Error::DuplicateLogicalId(name));
        }
        self.outputs.insert(name, output);
        Ok(())
    }

    /// Looks up a resource by logical id.
    pub fn get(&self, id: &str) -> Option<&Resource> {
        self.resources.get(id)
    }

    /// Iterates over resources in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Resource)> {
        self.resources.iter().map(|(id, r)| (id.as_str(), r))
    }

    /// The published outputs in declaration order.
    pub fn outputs(&self) -> impl Iterator<Item = (&str, &Output)> {
        self.outputs.iter().map(|(name, o)| (name.as_str(), o))
    }

    /// Number of declared resources.
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Returns true if nothing has been declared.
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Validates the whole graph: reference resolution, CIDR containment
    /// and overlap, ACL rule numbering, and NAT gateway placement.
    ///
    /// Nothing may be handed to the provisioning engine unless this
    /// returns `Ok`.
    pub fn validate(&self) -> Result<()> {
        validate::validate(self)
    }

    /// The creation order implied by the reference direction of the
    /// records: a resource appears after everything it references.
    ///
    /// Ties are broken by declaration order, so the result is stable
    /// across runs.
    pub fn deployment_order(&self) -> Result<Vec<&str>> {
        let graph = self.dependency_graph()?;
        let mut pending: Vec<usize> = graph
            .node_indices()
            .map(|n| graph.edges_directed(n, Direction::Incoming).count())
            .collect();

        let mut ready: VecDeque<NodeIndex> = graph
            .node_indices()
            .filter(|n| pending[n.index()] == 0)
            .collect();
        let mut order = Vec::with_capacity(graph.node_count());
        while let Some(node) = ready.pop_front() {
            order.push(graph[node]);
            for edge in graph.edges_directed(node, Direction::Outgoing) {
                let target = edge.target();
                pending[target.index()] -= 1;
                if pending[target.index()] == 0 {
                    ready.push_back(target);
                }
            }
        }

        if order.len() != graph.node_count() {
            let members: Vec<String> = tarjan_scc(&graph)
                .into_iter()
                .filter(|scc| scc.len() > 1)
                .flatten()
                .map(|idx| graph[idx].to_string())
                .collect();
            return Err(Error::DependencyCycle(members.join(", ")));
        }
        Ok(order)
    }

    /// DOT rendering of the dependency graph, for visualization.
    pub fn to_dot(&self) -> Result<String> {
        let graph = self.dependency_graph()?;
        let mut output = String::new();
        output.push_str("digraph topology {\n");
        output.push_str("  rankdir=LR;\n");
        output.push_str("  node [shape=box];\n");
        for (id, resource) in self.iter() {
            output.push_str(&format!(
                "  \"{}\" [label=\"{}\\n{}\"];\n",
                id,
                id,
                resource.kind()
            ));
        }
        for edge in graph.raw_edges() {
            output.push_str(&format!(
                "  \"{}\" -> \"{}\";\n",
                graph[edge.source()],
                graph[edge.target()]
            ));
        }
        output.push_str("}\n");
        Ok(output)
    }

    /// Builds the dependency DiGraph with edges from referenced resource
    /// to referencing resource. Fails on dangling references.
    fn dependency_graph(&self) -> Result<DiGraph<&str, ()>> {
        let mut graph = DiGraph::new();
        let mut indices: HashMap<&str, NodeIndex> = HashMap::new();
        for (id, _) in self.iter() {
            indices.insert(id, graph.add_node(id));
        }
        for (id, resource) in self.iter() {
            for (kind, reference) in resource.references() {
                let from = indices.get(reference.as_str()).ok_or_else(|| {
                    Error::unresolved_reference(
                        id,
                        format!("'{reference}' ({kind}) does not exist in the topology"),
                    )
                })?;
                graph.add_edge(*from, indices[id], ());
            }
        }
        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cidr::Cidr;
    use crate::resources::{Instance, MachineImage, SecurityGroup, Subnet, Vpc};

    fn sample() -> Topology {
        let mut topology = Topology::new();
        let vpc = topology
            .add("Vpc", Vpc::new(Cidr::from_octets(10, 0, 0, 0, 24)))
            .unwrap();
        let subnet = topology
            .add(
                "Subnet",
                Subnet::new(vpc.clone(), Cidr::from_octets(10, 0, 0, 0, 26), "us-east-1a"),
            )
            .unwrap();
        let group = topology
            .add("Group", SecurityGroup::new(vpc, "test group"))
            .unwrap();
        topology
            .add(
                "Host",
                Instance::new(MachineImage::AmazonLinux2, "t2.micro", subnet, group),
            )
            .unwrap();
        topology
    }

    #[test]
    fn test_duplicate_logical_id_rejected() {
        let mut topology = sample();
        let err = topology
            .add("Vpc", Vpc::new(Cidr::from_octets(10, 1, 0, 0, 24)))
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateLogicalId(id) if id == "Vpc"));
    }

    #[test]
    fn test_deployment_order_respects_references() {
        let topology = sample();
        let order = topology.deployment_order().unwrap();
        let pos = |id: &str| order.iter().position(|r| *r == id).unwrap();
        assert!(pos("Vpc") < pos("Subnet"));
        assert!(pos("Vpc") < pos("Group"));
        assert!(pos("Subnet") < pos("Host"));
        assert!(pos("Group") < pos("Host"));
    }

    #[test]
    fn test_order_is_deterministic() {
        let first: Vec<String> = sample()
            .deployment_order()
            .unwrap()
            .iter()
            .map(|s| s.to_string())
            .collect();
        let second: Vec<String> = sample()
            .deployment_order()
            .unwrap()
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_dangling_reference_fails_order() {
        let mut topology = Topology::new();
        topology
            .add(
                "Orphan",
                Subnet::new("Missing", Cidr::from_octets(10, 0, 0, 0, 26), "us-east-1a"),
            )
            .unwrap();
        let err = topology.deployment_order().unwrap_err();
        assert!(matches!(err, Error::UnresolvedReference { .. }));
    }

    #[test]
    fn test_to_dot_lists_resources() {
        let dot = sample().to_dot().unwrap();
        assert!(dot.contains("digraph"));
        assert!(dot.contains("\"Vpc\" -> \"Subnet\""));
    }
}
