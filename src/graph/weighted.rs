//! Immutable weighted undirected graph in compressed sparse row form

use std::collections::HashMap;
use std::mem;

use serde::{Deserialize, Serialize};

/// An undirected weighted edge between two node indices
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub source: usize,
    pub target: usize,
    pub weight: f64,
}

impl Edge {
    /// The endpoint opposite to `node`
    pub fn other(&self, node: usize) -> usize {
        if self.source == node {
            self.target
        } else {
            self.source
        }
    }
}

/// Weighted graph with a dense node index range `[0, node_count)`.
///
/// Built once by [`GraphBuilder`](crate::graph::builder::GraphBuilder) and never
/// mutated afterwards; a changed network is handled by building a new graph.
#[derive(Debug, Clone)]
pub struct WeightedGraph {
    /// External identifiers, indexed by node index
    pub(crate) node_ids: Vec<String>,

    pub(crate) id_to_index: HashMap<String, usize>,

    pub(crate) edges: Vec<Edge>,

    /// offsets[i]..offsets[i+1] is the adjacency range of node i
    pub(crate) offsets: Vec<usize>,

    /// Concatenated adjacency lists of (neighbour, edge index)
    pub(crate) adjacency: Vec<(usize, usize)>,

    pub(crate) weighted_degrees: Vec<f64>,
}

impl WeightedGraph {
    pub fn node_count(&self) -> usize {
        self.node_ids.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn edge(&self, index: usize) -> Option<&Edge> {
        self.edges.get(index)
    }

    /// Neighbours of a node with the weight of the connecting edge
    pub fn neighbors(&self, node: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let start = self.offsets[node];
        let end = self.offsets[node + 1];
        self.adjacency[start..end]
            .iter()
            .map(move |&(neighbor, edge)| (neighbor, self.edges[edge].weight))
    }

    pub fn degree(&self, node: usize) -> usize {
        self.offsets[node + 1] - self.offsets[node]
    }

    /// Sum of the weights of all edges incident on `node`
    pub fn weighted_degree(&self, node: usize) -> f64 {
        self.weighted_degrees[node]
    }

    pub fn node_id(&self, node: usize) -> Option<&str> {
        self.node_ids.get(node).map(String::as_str)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.id_to_index.get(id).copied()
    }

    /// External identifiers in index order (which is the network's enumeration order)
    pub fn node_ids(&self) -> &[String] {
        &self.node_ids
    }

    pub fn total_weight(&self) -> f64 {
        self.edges.iter().map(|e| e.weight).sum()
    }

    /// Estimate memory usage in bytes
    pub fn memory_usage(&self) -> usize {
        let base = mem::size_of::<Self>();
        let ids = self
            .node_ids
            .iter()
            .map(|s| s.capacity() + mem::size_of::<String>())
            .sum::<usize>();
        let index = self.id_to_index.capacity() * (mem::size_of::<String>() + mem::size_of::<usize>());
        let edges = self.edges.capacity() * mem::size_of::<Edge>();
        let offsets = self.offsets.capacity() * mem::size_of::<usize>();
        let adjacency = self.adjacency.capacity() * mem::size_of::<(usize, usize)>();
        let degrees = self.weighted_degrees.capacity() * mem::size_of::<f64>();

        base + ids + index + edges + offsets + adjacency + degrees
    }
}
