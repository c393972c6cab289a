//! Clustering algorithms driven by a quality function

use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;

use itertools::Itertools;

use crate::cluster::nodeset::{MutableNodeSet, NodeSet, NodeSetView, ValuedNodeSet};
use crate::cluster::quality::{normalize_nan, QualityFunction};
use crate::config::ClusteringConfig;
use crate::error::Result;
use crate::graph::algorithms::nodes_by_weighted_degree;
use crate::graph::WeightedGraph;
use crate::task::CancellationToken;

/// Smallest quality gain that still counts as an improvement
const MIN_GAIN: f64 = 1e-12;

/// A clustering algorithm parameterized by a quality function.
///
/// Implementations must poll `token` and return early once it is cancelled;
/// whatever they return after that is discarded.
pub trait ClusteringAlgorithm: Send + Sync {
    fn name(&self) -> &'static str;

    fn run(
        &self,
        graph: &Arc<WeightedGraph>,
        quality: &dyn QualityFunction,
        config: &ClusteringConfig,
        token: &CancellationToken,
    ) -> Result<Vec<ValuedNodeSet>>;
}

/// Greedy growth from single-node seeds.
///
/// Seeds are tried in decreasing weighted degree, skipping nodes already
/// covered by an accepted cluster. Each seed grows by repeatedly applying the
/// single addition or removal with the largest quality gain until no move
/// improves the quality.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyGrowth;

#[derive(Debug, Clone, Copy)]
enum Move {
    Add(usize),
    Remove(usize),
}

impl GreedyGrowth {
    /// Grow `set` from `seed`, discarding whatever it held before
    fn grow(
        &self,
        set: &mut MutableNodeSet,
        seed: usize,
        quality: &dyn QualityFunction,
        token: &CancellationToken,
    ) {
        let graph = Arc::clone(set.graph_arc());
        set.clear();
        set.add(seed);

        while !token.is_cancelled() {
            let additions = set
                .members()
                .iter()
                .flat_map(|&member| graph.neighbors(member).map(|(neighbor, _)| neighbor))
                .filter(|&neighbor| !set.contains(neighbor))
                .unique()
                .map(|node| (Move::Add(node), normalize_nan(quality.addition_affinity(&*set, node))));

            let removals = set
                .members()
                .iter()
                .filter(|_| set.len() > 1)
                .map(|&node| (Move::Remove(node), -normalize_nan(quality.removal_affinity(&*set, node))));

            let best = additions
                .chain(removals)
                .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));

            match best {
                Some((Move::Add(node), gain)) if gain > MIN_GAIN => {
                    set.add(node);
                }
                Some((Move::Remove(node), gain)) if gain > MIN_GAIN => {
                    set.remove(node);
                }
                _ => break,
            }
        }
    }
}

impl ClusteringAlgorithm for GreedyGrowth {
    fn name(&self) -> &'static str {
        "greedy-growth"
    }

    fn run(
        &self,
        graph: &Arc<WeightedGraph>,
        quality: &dyn QualityFunction,
        config: &ClusteringConfig,
        token: &CancellationToken,
    ) -> Result<Vec<ValuedNodeSet>> {
        let mut seeds = nodes_by_weighted_degree(graph);
        if let Some(max_seeds) = config.max_seeds {
            seeds.truncate(max_seeds);
        }
        log::info!(
            "Growing clusters from up to {} seeds using {}",
            seeds.len(),
            quality.name()
        );

        let mut covered = vec![false; graph.node_count()];
        let mut grown = MutableNodeSet::new(Arc::clone(graph));
        let mut seen: HashSet<Vec<usize>> = HashSet::new();
        let mut clusters = Vec::new();

        for seed in seeds {
            if token.is_cancelled() {
                log::info!("Cluster growth cancelled after {} clusters", clusters.len());
                break;
            }
            if covered[seed] {
                continue;
            }

            self.grow(&mut grown, seed, quality, token);
            if grown.len() < config.min_size || grown.density() < config.min_density {
                continue;
            }

            let key: Vec<usize> = grown.members().iter().copied().sorted_unstable().collect();
            if !seen.insert(key) {
                continue;
            }

            for &member in grown.members() {
                covered[member] = true;
            }
            let members = NodeSet::new(Arc::clone(graph), grown.members().iter().copied());
            let cluster = ValuedNodeSet::new(members, quality);
            log::debug!(
                "Accepted cluster of {} nodes from seed {} with quality {:.4}",
                cluster.len(),
                seed,
                cluster.quality
            );
            clusters.push(cluster);
        }

        // Sort clusters by quality (best first)
        clusters.sort_by(|a, b| b.quality.partial_cmp(&a.quality).unwrap_or(Ordering::Equal));

        log::info!(
            "Found {} clusters with {} or more members",
            clusters.len(),
            config.min_size
        );

        Ok(clusters)
    }
}
