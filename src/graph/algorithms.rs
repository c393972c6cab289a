//! Graph algorithms used when seeding cluster growth

use std::cmp::Ordering;

use crate::graph::WeightedGraph;

/// Node indices sorted by weighted degree, highest first.
///
/// Ties keep index order so the result is deterministic. Isolated nodes are
/// left out; they cannot seed a cluster.
pub fn nodes_by_weighted_degree(graph: &WeightedGraph) -> Vec<usize> {
    let mut node_degrees: Vec<(usize, f64)> = (0..graph.node_count())
        .filter(|&node| graph.degree(node) > 0)
        .map(|node| (node, graph.weighted_degree(node)))
        .collect();

    node_degrees.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then(a.0.cmp(&b.0))
    });

    node_degrees.into_iter().map(|(node, _)| node).collect()
}
