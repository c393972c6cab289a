//! Node subsets of a graph with incrementally maintained edge weight totals

use std::sync::Arc;

use crate::cluster::quality::{normalize_nan, QualityFunction};
use crate::graph::WeightedGraph;

const NOT_MEMBER: usize = usize::MAX;

/// Aggregates a quality function is computed from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SetStatistics {
    pub size: usize,

    /// Total weight of edges with both endpoints inside the set
    pub internal_weight: f64,

    /// Total weight of edges with exactly one endpoint inside the set
    pub boundary_weight: f64,
}

impl SetStatistics {
    /// Statistics after adding a node whose incident edges weigh `to_members`
    /// towards the set and `to_outside` towards the rest of the graph
    pub fn after_addition(&self, to_members: f64, to_outside: f64) -> Self {
        Self {
            size: self.size + 1,
            internal_weight: self.internal_weight + to_members,
            boundary_weight: self.boundary_weight - to_members + to_outside,
        }
    }

    /// Statistics after removing a member, with its incident weights split
    /// the same way as for [`after_addition`](Self::after_addition)
    pub fn after_removal(&self, to_members: f64, to_outside: f64) -> Self {
        Self {
            size: self.size.saturating_sub(1),
            internal_weight: self.internal_weight - to_members,
            boundary_weight: self.boundary_weight + to_members - to_outside,
        }
    }

    /// Internal weight over the number of possible internal edges; 0 below two nodes
    pub fn density(&self) -> f64 {
        if self.size < 2 {
            return 0.0;
        }
        let possible = (self.size * (self.size - 1)) as f64 / 2.0;
        self.internal_weight / possible
    }
}

/// Read access shared by every kind of node set
pub trait NodeSetView {
    fn graph(&self) -> &WeightedGraph;

    fn contains(&self, node: usize) -> bool;

    /// Members in a stable, otherwise unspecified order
    fn members(&self) -> &[usize];

    fn internal_weight(&self) -> f64;

    fn boundary_weight(&self) -> f64;

    fn len(&self) -> usize {
        self.members().len()
    }

    fn is_empty(&self) -> bool {
        self.members().is_empty()
    }

    /// Weights of the edges incident on `node`, split into those leading to
    /// members and those leading elsewhere. Runs in O(degree(node)).
    fn incident_weights(&self, node: usize) -> (f64, f64) {
        let mut to_members = 0.0;
        let mut to_outside = 0.0;
        for (neighbor, weight) in self.graph().neighbors(node) {
            if self.contains(neighbor) {
                to_members += weight;
            } else {
                to_outside += weight;
            }
        }
        (to_members, to_outside)
    }

    fn statistics(&self) -> SetStatistics {
        SetStatistics {
            size: self.len(),
            internal_weight: self.internal_weight(),
            boundary_weight: self.boundary_weight(),
        }
    }

    fn density(&self) -> f64 {
        self.statistics().density()
    }
}

/// A node set supporting single-node additions and removals.
///
/// Internal and boundary weights are updated from the edges incident on the
/// moved node only, so each mutation costs O(degree).
#[derive(Debug, Clone)]
pub struct MutableNodeSet {
    graph: Arc<WeightedGraph>,
    members: Vec<usize>,
    /// Position of each node in `members`, or NOT_MEMBER
    slots: Vec<usize>,
    internal_weight: f64,
    boundary_weight: f64,
}

impl MutableNodeSet {
    pub fn new(graph: Arc<WeightedGraph>) -> Self {
        let node_count = graph.node_count();
        Self {
            graph,
            members: Vec::new(),
            slots: vec![NOT_MEMBER; node_count],
            internal_weight: 0.0,
            boundary_weight: 0.0,
        }
    }

    pub fn from_members(graph: Arc<WeightedGraph>, members: impl IntoIterator<Item = usize>) -> Self {
        let mut set = Self::new(graph);
        for node in members {
            set.add(node);
        }
        set
    }

    /// Shared handle to the underlying graph
    pub fn graph_arc(&self) -> &Arc<WeightedGraph> {
        &self.graph
    }

    /// Add a node; returns false when it was already a member.
    ///
    /// # Panics
    ///
    /// Panics if `node` is not a valid index of the graph.
    pub fn add(&mut self, node: usize) -> bool {
        if self.slots[node] != NOT_MEMBER {
            return false;
        }

        let (to_members, to_outside) = self.incident_weights(node);
        self.internal_weight += to_members;
        self.boundary_weight += to_outside - to_members;

        self.slots[node] = self.members.len();
        self.members.push(node);
        true
    }

    /// Remove a node; returns false when it was not a member.
    ///
    /// # Panics
    ///
    /// Panics if `node` is not a valid index of the graph.
    pub fn remove(&mut self, node: usize) -> bool {
        let slot = self.slots[node];
        if slot == NOT_MEMBER {
            return false;
        }

        let (to_members, to_outside) = self.incident_weights(node);
        self.internal_weight -= to_members;
        self.boundary_weight += to_members - to_outside;

        self.members.swap_remove(slot);
        if let Some(&moved) = self.members.get(slot) {
            self.slots[moved] = slot;
        }
        self.slots[node] = NOT_MEMBER;

        if self.members.is_empty() {
            self.internal_weight = 0.0;
            self.boundary_weight = 0.0;
        }
        true
    }

    /// Remove every member, resetting only the slots members occupied
    pub fn clear(&mut self) {
        for node in self.members.drain(..) {
            self.slots[node] = NOT_MEMBER;
        }
        self.internal_weight = 0.0;
        self.boundary_weight = 0.0;
    }

    /// Internal and boundary weight recounted from scratch over all members
    pub fn recomputed_weights(&self) -> (f64, f64) {
        let mut internal = 0.0;
        let mut boundary = 0.0;
        for edge in self.graph.edges() {
            match (self.contains(edge.source), self.contains(edge.target)) {
                (true, true) => internal += edge.weight,
                (true, false) | (false, true) => boundary += edge.weight,
                (false, false) => {}
            }
        }
        (internal, boundary)
    }

    pub fn freeze(self) -> NodeSet {
        NodeSet { inner: self }
    }
}

impl NodeSetView for MutableNodeSet {
    fn graph(&self) -> &WeightedGraph {
        &self.graph
    }

    fn contains(&self, node: usize) -> bool {
        self.slots.get(node).is_some_and(|&slot| slot != NOT_MEMBER)
    }

    fn members(&self) -> &[usize] {
        &self.members
    }

    fn internal_weight(&self) -> f64 {
        self.internal_weight
    }

    fn boundary_weight(&self) -> f64 {
        self.boundary_weight
    }
}

/// A read-only node set over a specific graph
#[derive(Debug, Clone)]
pub struct NodeSet {
    inner: MutableNodeSet,
}

impl NodeSet {
    /// Build a set from member indices; duplicates are ignored.
    ///
    /// # Panics
    ///
    /// Panics if any index is out of range for `graph`.
    pub fn new(graph: Arc<WeightedGraph>, members: impl IntoIterator<Item = usize>) -> Self {
        MutableNodeSet::from_members(graph, members).freeze()
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.inner.members.iter().copied()
    }

    /// External identifiers of the members, in member order
    pub fn member_ids(&self) -> Vec<&str> {
        self.iter()
            .filter_map(|node| self.inner.graph.node_id(node))
            .collect()
    }

    pub fn graph_arc(&self) -> &Arc<WeightedGraph> {
        &self.inner.graph
    }

    pub fn to_mutable(&self) -> MutableNodeSet {
        self.inner.clone()
    }
}

impl NodeSetView for NodeSet {
    fn graph(&self) -> &WeightedGraph {
        self.inner.graph()
    }

    fn contains(&self, node: usize) -> bool {
        self.inner.contains(node)
    }

    fn members(&self) -> &[usize] {
        self.inner.members()
    }

    fn internal_weight(&self) -> f64 {
        self.inner.internal_weight
    }

    fn boundary_weight(&self) -> f64 {
        self.inner.boundary_weight
    }
}

impl From<MutableNodeSet> for NodeSet {
    fn from(set: MutableNodeSet) -> Self {
        set.freeze()
    }
}

/// A node set together with the quality it had when it was scored.
///
/// The score is not refreshed if a mutable copy of the set is changed later.
#[derive(Debug, Clone)]
pub struct ValuedNodeSet {
    pub set: NodeSet,
    pub quality: f64,
}

impl ValuedNodeSet {
    pub fn new(set: NodeSet, quality: &dyn QualityFunction) -> Self {
        let score = normalize_nan(quality.calculate(&set));
        Self { set, quality: score }
    }

    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }
}
