//! Quality functions scoring node sets and single-node changes to them

use std::fmt;

use crate::cluster::nodeset::{NodeSetView, SetStatistics};

/// Replace NaN by 0.0
pub fn normalize_nan(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value
    }
}

/// Scoring policy for node sets.
///
/// Implementations only define [`score`](Self::score) over set aggregates.
/// The affinity probes derive the aggregates of the changed set from the
/// edges incident on the probed node, so they run in O(degree) and never
/// touch the set itself.
pub trait QualityFunction: Send + Sync + fmt::Debug {
    fn name(&self) -> &'static str;

    /// Quality of a set with the given aggregates; may be NaN for degenerate sets
    fn score(&self, stats: &SetStatistics) -> f64;

    fn calculate(&self, set: &dyn NodeSetView) -> f64 {
        self.score(&set.statistics())
    }

    /// `calculate(set ∪ {node}) − calculate(set)` for a node outside the set
    fn addition_affinity(&self, set: &dyn NodeSetView, node: usize) -> f64 {
        debug_assert!(!set.contains(node), "addition probe on a member");
        let current = set.statistics();
        let (to_members, to_outside) = set.incident_weights(node);
        self.score(&current.after_addition(to_members, to_outside)) - self.score(&current)
    }

    /// `calculate(set) − calculate(set \ {node})` for a member of the set
    fn removal_affinity(&self, set: &dyn NodeSetView, node: usize) -> f64 {
        debug_assert!(set.contains(node), "removal probe on a non-member");
        let current = set.statistics();
        let (to_members, to_outside) = set.incident_weights(node);
        self.score(&current) - self.score(&current.after_removal(to_members, to_outside))
    }
}

/// Cohesiveness: `internal / (internal + boundary + penalty)`.
///
/// The penalty stands for the expected weight of boundary edges missing
/// from incomplete network data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CohesivenessFunction {
    pub penalty: f64,
}

impl CohesivenessFunction {
    pub fn new(penalty: f64) -> Self {
        Self { penalty }
    }
}

impl Default for CohesivenessFunction {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl QualityFunction for CohesivenessFunction {
    fn name(&self) -> &'static str {
        "cohesiveness"
    }

    fn score(&self, stats: &SetStatistics) -> f64 {
        stats.internal_weight / (stats.internal_weight + stats.boundary_weight + self.penalty)
    }
}

/// Weighted density: internal weight over the number of node pairs
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DensityFunction;

impl QualityFunction for DensityFunction {
    fn name(&self) -> &'static str {
        "density"
    }

    fn score(&self, stats: &SetStatistics) -> f64 {
        stats.density()
    }
}
