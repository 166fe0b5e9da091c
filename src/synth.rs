//! Synthesis of the provisioning document.
//!
//! The document is what crosses the boundary to the external provisioning
//! engine: the validated resources in creation order plus the published
//! outputs. Synthesis always validates first; a partial or inconsistent
//! graph is never emitted.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::graph::{Output, Topology};
use crate::resources::Resource;

/// Format version tag carried by every synthesized document.
pub const MANIFEST_VERSION: &str = "stackform/1";

/// One resource entry of the document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestResource {
    /// Logical id
    pub id: String,
    /// The resource record, flattened next to the id
    #[serde(flatten)]
    pub resource: Resource,
}

/// The synthesized provisioning document.
///
/// Resources are listed in deployment order, so an engine that creates
/// them front to back never sees a forward reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    /// Document format version
    pub version: String,
    /// Resources in creation order
    pub resources: Vec<ManifestResource>,
    /// Published outputs
    pub outputs: IndexMap<String, Output>,
}

impl Manifest {
    /// Pretty-printed JSON rendering.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// YAML rendering.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// Validates the topology and synthesizes the provisioning document.
pub fn synthesize(topology: &Topology) -> Result<Manifest> {
    topology.validate()?;
    let order = topology.deployment_order()?;

    let mut resources = Vec::with_capacity(order.len());
    for id in order {
        if let Some(resource) = topology.get(id) {
            resources.push(ManifestResource {
                id: id.to_string(),
                resource: resource.clone(),
            });
        }
    }

    let outputs: IndexMap<String, Output> = topology
        .outputs()
        .map(|(name, output)| (name.to_string(), output.clone()))
        .collect();

    info!(
        resources = resources.len(),
        outputs = outputs.len(),
        "synthesized provisioning document"
    );
    Ok(Manifest {
        version: MANIFEST_VERSION.to_string(),
        resources,
        outputs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cidr::Cidr;
    use crate::graph::OutputValue;
    use crate::resources::{Ref, Subnet, Vpc};

    fn sample() -> Topology {
        let mut topology = Topology::new();
        let vpc = topology
            .add("Vpc", Vpc::new(Cidr::from_octets(10, 0, 0, 0, 24)))
            .unwrap();
        topology
            .add(
                "Subnet",
                Subnet::new(vpc.clone(), Cidr::from_octets(10, 0, 0, 0, 26), "us-east-1a").public(),
            )
            .unwrap();
        topology
            .add_output("VpcId", Output::id(vpc).with_description("VPC ID"))
            .unwrap();
        topology
    }

    #[test]
    fn test_synthesize_orders_resources() {
        let manifest = synthesize(&sample()).unwrap();
        assert_eq!(manifest.version, MANIFEST_VERSION);
        let ids: Vec<&str> = manifest.resources.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["Vpc", "Subnet"]);
    }

    #[test]
    fn test_synthesize_refuses_invalid_graph() {
        let mut topology = sample();
        topology
            .add_output("Broken", Output::id(Ref::new("Nowhere")))
            .unwrap();
        assert!(synthesize(&topology).is_err());
    }

    #[test]
    fn test_json_carries_type_tags_and_outputs() {
        let manifest = synthesize(&sample()).unwrap();
        let json = manifest.to_json().unwrap();
        assert!(json.contains("\"type\": \"vpc\""));
        assert!(json.contains("\"VpcId\""));

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["outputs"]["VpcId"]["description"], "VPC ID");
        assert!(matches!(
            serde_json::from_value::<Manifest>(value),
            Ok(m) if m.resources.len() == 2
        ));
        // output values keep their shape
        let output = sample().outputs().next().map(|(_, o)| o.value.clone());
        assert_eq!(output, Some(OutputValue::Id(Ref::new("Vpc"))));
    }
}
