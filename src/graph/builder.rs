//! Graph construction module

use std::collections::HashMap;

use crate::error::{EngineError, Result};
use crate::graph::weighted::{Edge, WeightedGraph};
use crate::network::Network;

/// Builder for incrementally constructing a WeightedGraph.
///
/// Parallel edges between the same pair of nodes are merged into a single
/// edge carrying the sum of their weights. Self-loops are dropped.
pub struct GraphBuilder {
    /// Mapping from string IDs to node indices
    id_to_index: HashMap<String, usize>,

    /// Node string IDs
    node_ids: Vec<String>,

    /// Merged edges
    edges: Vec<Edge>,

    /// Edge index for each unordered endpoint pair (smaller index first)
    pair_to_edge: HashMap<(usize, usize), usize>,

    /// Number of self-loops dropped so far
    self_loops: usize,
}

impl GraphBuilder {
    /// Create a new graph builder with the given node capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            id_to_index: HashMap::with_capacity(capacity),
            node_ids: Vec::with_capacity(capacity),
            edges: Vec::new(),
            pair_to_edge: HashMap::new(),
            self_loops: 0,
        }
    }

    /// Convert a network into a graph, reading edge weights from `weight_attr`.
    ///
    /// Edges without the attribute get weight 1.0, as do all edges when no
    /// attribute is named. A value that is not a number aborts the whole
    /// conversion.
    pub fn from_network(network: &dyn Network, weight_attr: Option<&str>) -> Result<WeightedGraph> {
        let mut builder = GraphBuilder::with_capacity(0);

        for id in network.node_ids() {
            builder.get_or_create_node(id);
        }

        for edge in network.edges() {
            let weight = match weight_attr.and_then(|name| edge.attribute(name).map(|v| (name, v))) {
                None => 1.0,
                Some((name, value)) => {
                    let weight = value.as_f64().ok_or_else(|| EngineError::NonNumericAttribute {
                        attribute: name.to_string(),
                        edge: edge.id,
                        value: value.to_string(),
                    })?;
                    if !weight.is_finite() || weight < 0.0 {
                        return Err(EngineError::InvalidWeight {
                            attribute: name.to_string(),
                            edge: edge.id,
                            value: weight,
                        });
                    }
                    weight
                }
            };
            builder.add_edge(edge.source, edge.target, weight);
        }

        let graph = builder.build();
        log::debug!(
            "Converted network {:?} to a graph with {} nodes and {} edges",
            network.handle(),
            graph.node_count(),
            graph.edge_count()
        );
        Ok(graph)
    }

    /// Get or create a node index for the given string ID
    pub fn get_or_create_node(&mut self, id: &str) -> usize {
        if let Some(&idx) = self.id_to_index.get(id) {
            return idx;
        }

        let idx = self.node_ids.len();
        self.id_to_index.insert(id.to_string(), idx);
        self.node_ids.push(id.to_string());
        idx
    }

    /// Add an undirected edge between two nodes
    pub fn add_edge(&mut self, src_id: &str, dst_id: &str, weight: f64) {
        let src_idx = self.get_or_create_node(src_id);
        let dst_idx = self.get_or_create_node(dst_id);

        if src_idx == dst_idx {
            self.self_loops += 1;
            return;
        }

        let key = (src_idx.min(dst_idx), src_idx.max(dst_idx));
        match self.pair_to_edge.get(&key) {
            Some(&edge) => self.edges[edge].weight += weight,
            None => {
                self.pair_to_edge.insert(key, self.edges.len());
                self.edges.push(Edge {
                    source: key.0,
                    target: key.1,
                    weight,
                });
            }
        }
    }

    /// Build the weighted graph
    pub fn build(self) -> WeightedGraph {
        let node_count = self.node_ids.len();

        if self.self_loops > 0 {
            log::debug!("Dropped {} self-loops", self.self_loops);
        }

        // Count incident edges per node
        let mut degrees = vec![0usize; node_count];
        for edge in &self.edges {
            degrees[edge.source] += 1;
            degrees[edge.target] += 1;
        }

        // Create offsets array
        let mut offsets = Vec::with_capacity(node_count + 1);
        offsets.push(0);
        let mut offset = 0;
        for &degree in &degrees {
            offset += degree;
            offsets.push(offset);
        }

        // Fill adjacency lists
        let mut adjacency = vec![(0usize, 0usize); offset];
        let mut current_pos = vec![0usize; node_count];
        let mut weighted_degrees = vec![0.0f64; node_count];
        for (edge_idx, edge) in self.edges.iter().enumerate() {
            for (node, neighbor) in [(edge.source, edge.target), (edge.target, edge.source)] {
                adjacency[offsets[node] + current_pos[node]] = (neighbor, edge_idx);
                current_pos[node] += 1;
                weighted_degrees[node] += edge.weight;
            }
        }

        WeightedGraph {
            node_ids: self.node_ids,
            id_to_index: self.id_to_index,
            edges: self.edges,
            offsets,
            adjacency,
            weighted_degrees,
        }
    }
}
