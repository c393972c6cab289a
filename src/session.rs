//! Clustering session: converts networks, drives the clustering algorithm
//! and writes results back to the attribute store

use std::sync::Arc;

use crate::attributes::AttributeStore;
use crate::cluster::annotate::{self, AnnotationOutcome};
use crate::cluster::growth::{ClusteringAlgorithm, GreedyGrowth};
use crate::cluster::nodeset::{NodeSet, ValuedNodeSet};
use crate::config::ClusteringConfig;
use crate::error::{EngineError, Result};
use crate::graph::{GraphCache, WeightedGraph};
use crate::mediator::Mediator;
use crate::network::events::EventSource;
use crate::network::Network;
use crate::task::{CancellationToken, TaskExecutor, TaskOutcome, ThreadExecutor};

/// Outcome of a run that may be cancelled; cancellation is not an error
#[derive(Debug)]
pub enum RunOutcome<T> {
    Completed(T),
    Cancelled,
}

impl<T> RunOutcome<T> {
    pub fn completed(self) -> Option<T> {
        match self {
            RunOutcome::Completed(value) => Some(value),
            RunOutcome::Cancelled => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, RunOutcome::Cancelled)
    }
}

/// Everything a completed run produced
#[derive(Debug)]
pub struct ClusteringResult {
    /// The graph the clusters index into
    pub graph: Arc<WeightedGraph>,

    pub clusters: Vec<ValuedNodeSet>,

    /// Outcome of the status write, when a store was given
    pub status: Option<AnnotationOutcome>,
}

/// Session-scoped orchestration state.
///
/// Owns the graph cache for the whole session. All calls are expected from
/// one control thread; only the algorithm itself runs on the executor's
/// worker.
pub struct ClusteringSession<E: TaskExecutor = ThreadExecutor> {
    cache: Arc<GraphCache>,
    executor: E,
    algorithm: Arc<dyn ClusteringAlgorithm>,
    mediator: Arc<dyn Mediator>,
    token: CancellationToken,
}

impl ClusteringSession<ThreadExecutor> {
    /// Start a session whose cache follows change events from `events`
    pub fn new(events: &dyn EventSource, mediator: Arc<dyn Mediator>) -> Self {
        Self {
            cache: GraphCache::subscribed_to(events),
            executor: ThreadExecutor,
            algorithm: Arc::new(GreedyGrowth),
            mediator,
            token: CancellationToken::new(),
        }
    }
}

impl<E: TaskExecutor> ClusteringSession<E> {
    pub fn with_executor<F: TaskExecutor>(self, executor: F) -> ClusteringSession<F> {
        ClusteringSession {
            cache: self.cache,
            executor,
            algorithm: self.algorithm,
            mediator: self.mediator,
            token: self.token,
        }
    }

    pub fn with_algorithm(mut self, algorithm: Arc<dyn ClusteringAlgorithm>) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn cache(&self) -> &Arc<GraphCache> {
        &self.cache
    }

    /// Drop every cached graph
    pub fn reset_cache(&self) {
        self.cache.clear();
    }

    /// Token that cancels the run in flight. It is reset when a run starts
    /// and again when it ends, so a cancel only ever affects the current run.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Convert a network through the session cache
    pub fn convert(&self, network: &dyn Network, weight_attr: Option<&str>) -> Result<Arc<WeightedGraph>> {
        self.cache.convert(network, weight_attr).map_err(|err| {
            match &err {
                EngineError::NonNumericAttribute { .. } => {
                    self.mediator.notify("Weight attribute values must be numeric.")
                }
                other => self.mediator.notify(&other.to_string()),
            }
            err
        })
    }

    /// Run the clustering algorithm on `graph`, blocking until it completes
    /// or is cancelled
    pub fn run_algorithm(
        &self,
        graph: &Arc<WeightedGraph>,
        config: &ClusteringConfig,
    ) -> Result<RunOutcome<Vec<ValuedNodeSet>>> {
        config.validate()?;

        if graph.edge_count() == 0 {
            self.mediator.notify("The selected network contains no edges");
            return Err(EngineError::EmptyGraph);
        }

        let quality = config.quality_function();
        let algorithm = Arc::clone(&self.algorithm);
        log::info!(
            "Running {} on {} nodes and {} edges",
            algorithm.name(),
            graph.node_count(),
            graph.edge_count()
        );

        // A cancel left over from a finished run must not reach this one
        self.token.reset();
        let outcome = self.executor.execute(&self.token, |token| {
            algorithm.run(graph, quality.as_ref(), config, token)
        });
        self.token.reset();

        match outcome {
            TaskOutcome::Completed(clusters) => Ok(RunOutcome::Completed(clusters)),
            TaskOutcome::Cancelled => {
                log::info!("Clustering run cancelled");
                Ok(RunOutcome::Cancelled)
            }
            TaskOutcome::Failed(err) => {
                self.mediator.notify(&format!(
                    "{}\n\nThis is possibly a bug. Please report what you were doing \
                     and what the expected result would have been.",
                    err
                ));
                Err(err)
            }
        }
    }

    /// Cluster the current state of `network`.
    ///
    /// The cached graph for the network is always dropped first, so the run
    /// never sees a stale conversion. When `store` is given, a completed run
    /// also writes the status attribute.
    pub fn run(
        &self,
        network: &dyn Network,
        config: &ClusteringConfig,
        weight_attr: Option<&str>,
        store: Option<&mut dyn AttributeStore>,
    ) -> Result<RunOutcome<ClusteringResult>> {
        self.cache.invalidate(network.handle());
        let graph = self.convert(network, weight_attr)?;

        let clusters = match self.run_algorithm(&graph, config)? {
            RunOutcome::Completed(clusters) => clusters,
            RunOutcome::Cancelled => return Ok(RunOutcome::Cancelled),
        };

        let status = match store {
            Some(store) => Some(annotate::write_status(
                store,
                self.mediator.as_ref(),
                &graph,
                &clusters,
            )?),
            None => None,
        };

        Ok(RunOutcome::Completed(ClusteringResult {
            graph,
            clusters,
            status,
        }))
    }

    /// Write every node's affinity to `set` into `store`
    pub fn annotate_affinity(
        &self,
        set: &NodeSet,
        config: &ClusteringConfig,
        store: &mut dyn AttributeStore,
    ) -> Result<AnnotationOutcome> {
        let quality = config.quality_function();
        annotate::write_affinity(store, self.mediator.as_ref(), set, quality.as_ref())
    }
}
