//! Node status classification and cluster affinity annotation

use std::fmt;

use itertools::Itertools;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::attributes::{AttrType, AttrValue, AttributeStore};
use crate::cluster::nodeset::{NodeSetView, ValuedNodeSet};
use crate::cluster::quality::{normalize_nan, QualityFunction};
use crate::error::Result;
use crate::graph::WeightedGraph;
use crate::mediator::Mediator;

/// Node attribute holding the membership status after a clustering run.
///
/// A node is an `Outlier` (in no cluster), a `Cluster` member (in exactly
/// one) or an `Overlap` (in more than one).
pub const ATTRIBUTE_STATUS: &str = "cl1.Status";

/// Node attribute holding each node's affinity to one chosen cluster
pub const ATTRIBUTE_AFFINITY: &str = "cl1.Affinity";

/// Membership status of a node across all result clusters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeStatus {
    Outlier,
    Cluster,
    Overlap,
}

impl NodeStatus {
    /// Status for a node contained in `count` clusters
    pub fn from_count(count: usize) -> Self {
        match count {
            0 => NodeStatus::Outlier,
            1 => NodeStatus::Cluster,
            _ => NodeStatus::Overlap,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            NodeStatus::Outlier => "Outlier",
            NodeStatus::Cluster => "Cluster",
            NodeStatus::Overlap => "Overlap",
        }
    }
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of writing an annotation to the attribute store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotationOutcome {
    /// Values were written for this many nodes
    Written(usize),
    /// The user refused to retype a conflicting attribute; nothing was written
    Declined,
}

/// Number of nodes per status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSummary {
    pub outliers: usize,
    pub members: usize,
    pub overlaps: usize,
}

/// How many result clusters contain each node
pub fn membership_counts(graph: &WeightedGraph, results: &[ValuedNodeSet]) -> Vec<usize> {
    let node_count = graph.node_count();
    results
        .par_iter()
        .fold(
            || vec![0usize; node_count],
            |mut counts, cluster| {
                for &node in cluster.set.members() {
                    counts[node] += 1;
                }
                counts
            },
        )
        .reduce(
            || vec![0usize; node_count],
            |mut left, right| {
                for (l, r) in left.iter_mut().zip(right) {
                    *l += r;
                }
                left
            },
        )
}

pub fn classify(graph: &WeightedGraph, results: &[ValuedNodeSet]) -> Vec<NodeStatus> {
    membership_counts(graph, results)
        .into_iter()
        .map(NodeStatus::from_count)
        .collect()
}

pub fn summarize(statuses: &[NodeStatus]) -> StatusSummary {
    let counts = statuses.iter().counts();
    StatusSummary {
        outliers: counts.get(&NodeStatus::Outlier).copied().unwrap_or(0),
        members: counts.get(&NodeStatus::Cluster).copied().unwrap_or(0),
        overlaps: counts.get(&NodeStatus::Overlap).copied().unwrap_or(0),
    }
}

/// Affinity of every node of the graph to `set`, indexed by node.
///
/// For a member this is the quality the set would lose without it, for any
/// other node the quality the set would gain with it; strong members and
/// promising candidates are both positive. NaN becomes 0.0.
pub fn node_affinities<S>(set: &S, quality: &dyn QualityFunction) -> Vec<f64>
where
    S: NodeSetView + Sync,
{
    (0..set.graph().node_count())
        .into_par_iter()
        .map(|node| {
            let affinity = if set.contains(node) {
                quality.removal_affinity(set, node)
            } else {
                quality.addition_affinity(set, node)
            };
            normalize_nan(affinity)
        })
        .collect()
}

/// Classify nodes by cluster membership and store the labels as
/// [`ATTRIBUTE_STATUS`]
pub fn write_status(
    store: &mut dyn AttributeStore,
    mediator: &dyn Mediator,
    graph: &WeightedGraph,
    results: &[ValuedNodeSet],
) -> Result<AnnotationOutcome> {
    if !ensure_attribute_type(store, mediator, ATTRIBUTE_STATUS, AttrType::String) {
        return Ok(AnnotationOutcome::Declined);
    }

    let statuses = classify(graph, results);
    for (id, status) in graph.node_ids().iter().zip(&statuses) {
        store.set_attribute(id, ATTRIBUTE_STATUS, AttrValue::String(status.label().to_string()))?;
    }

    let summary = summarize(&statuses);
    log::info!(
        "Status written: {} in clusters, {} overlaps, {} outliers",
        summary.members,
        summary.overlaps,
        summary.outliers
    );
    Ok(AnnotationOutcome::Written(statuses.len()))
}

/// Store every node's affinity to `set` as [`ATTRIBUTE_AFFINITY`]
pub fn write_affinity<S>(
    store: &mut dyn AttributeStore,
    mediator: &dyn Mediator,
    set: &S,
    quality: &dyn QualityFunction,
) -> Result<AnnotationOutcome>
where
    S: NodeSetView + Sync,
{
    if !ensure_attribute_type(store, mediator, ATTRIBUTE_AFFINITY, AttrType::Floating) {
        return Ok(AnnotationOutcome::Declined);
    }

    let affinities = node_affinities(set, quality);
    for (id, affinity) in set.graph().node_ids().iter().zip(&affinities) {
        store.set_attribute(id, ATTRIBUTE_AFFINITY, AttrValue::Floating(*affinity))?;
    }

    log::info!(
        "Affinity to a cluster of {} nodes written for {} nodes",
        set.len(),
        affinities.len()
    );
    Ok(AnnotationOutcome::Written(affinities.len()))
}

/// Make sure `name` can take values of `expected`, asking before dropping
/// an incompatible attribute. Returns false when the user declines.
fn ensure_attribute_type(
    store: &mut dyn AttributeStore,
    mediator: &dyn Mediator,
    name: &str,
    expected: AttrType,
) -> bool {
    let found = match store.attribute_type(name) {
        Some(found) if found != expected => found,
        _ => return true,
    };

    log::warn!(
        "Node attribute {} holds {:?} values, expected {:?}",
        name,
        found,
        expected
    );
    let question = format!(
        "A node attribute named {} already exists and it is not a {:?} attribute.\n\
         Do you want to remove the existing attribute and re-register it as a {:?} attribute?",
        name, expected, expected
    );
    if !mediator.confirm(&question) {
        log::info!("Keeping existing attribute {}; annotation skipped", name);
        return false;
    }

    store.delete_attribute(name);
    true
}
