//! JSON network documents

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::network::{EdgeRecord, InMemoryNetwork};

/// On-disk network layout:
/// `{ "nodes": ["A", ...], "edges": [{ "source": "A", "target": "B", "attributes": { "weight": 1.5 } }] }`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkDocument {
    /// Nodes listed up front; edge endpoints are added when missing
    #[serde(default)]
    pub nodes: Vec<String>,

    #[serde(default)]
    pub edges: Vec<EdgeRecord>,
}

impl NetworkDocument {
    pub fn into_network(self, name: &str) -> InMemoryNetwork {
        let mut network = InMemoryNetwork::new(name);
        for node in &self.nodes {
            network.add_node(node);
        }
        for edge in self.edges {
            network.add_edge(&edge.source, &edge.target, edge.attributes);
        }
        network
    }
}

/// Load a network from a JSON document
pub fn load_network_json(path: &str) -> Result<InMemoryNetwork> {
    log::info!("Reading JSON network: {}", path);

    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path))?;
    let document: NetworkDocument =
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path))?;

    let name = Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("network");
    let network = document.into_network(name);

    log::info!(
        "Loaded network '{}' with {} nodes and {} edges",
        network.name(),
        network.node_count(),
        network.edge_count()
    );
    Ok(network)
}
