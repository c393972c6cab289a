//! End-to-end behaviour of conversion, clustering runs and annotation

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use cohesion_cluster::attributes::{AttrType, AttrValue, AttributeStore, NodeAttributes};
use cohesion_cluster::cluster::{
    ClusteringAlgorithm, CohesivenessFunction, GreedyGrowth, MutableNodeSet, NodeSet, NodeSetView,
    QualityFunction, ValuedNodeSet, ATTRIBUTE_AFFINITY, ATTRIBUTE_STATUS,
};
use cohesion_cluster::config::ClusteringConfig;
use cohesion_cluster::graph::WeightedGraph;
use cohesion_cluster::mediator::Mediator;
use cohesion_cluster::network::events::EventBus;
use cohesion_cluster::network::{InMemoryNetwork, Network};
use cohesion_cluster::task::{CancellationToken, InlineExecutor, ThreadExecutor};
use cohesion_cluster::{ClusteringSession, EngineError, RunOutcome};

#[derive(Default)]
struct RecordingMediator {
    answer: bool,
    questions: Mutex<Vec<String>>,
    messages: Mutex<Vec<String>>,
}

impl Mediator for RecordingMediator {
    fn confirm(&self, question: &str) -> bool {
        self.questions.lock().unwrap().push(question.to_string());
        self.answer
    }

    fn notify(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

/// Hands back a fixed list of member sets, as an external algorithm would
struct Precomputed(Vec<Vec<&'static str>>);

impl ClusteringAlgorithm for Precomputed {
    fn name(&self) -> &'static str {
        "precomputed"
    }

    fn run(
        &self,
        graph: &Arc<WeightedGraph>,
        quality: &dyn QualityFunction,
        _config: &ClusteringConfig,
        _token: &CancellationToken,
    ) -> cohesion_cluster::Result<Vec<ValuedNodeSet>> {
        Ok(self
            .0
            .iter()
            .map(|ids| {
                let members = ids.iter().filter_map(|id| graph.index_of(id));
                ValuedNodeSet::new(NodeSet::new(graph.clone(), members), quality)
            })
            .collect())
    }
}

fn weight(value: AttrValue) -> HashMap<String, AttrValue> {
    HashMap::from([("weight".to_string(), value)])
}

/// A–B(1.0), B–C(1.0), C–D(1.0)
fn abcd(bus: &Arc<EventBus>) -> InMemoryNetwork {
    let mut network = InMemoryNetwork::new("abcd").with_events(bus.clone());
    network.add_edge("A", "B", weight(AttrValue::Floating(1.0)));
    network.add_edge("B", "C", weight(AttrValue::Floating(1.0)));
    network.add_edge("C", "D", weight(AttrValue::Floating(1.0)));
    network
}

fn unit_penalty() -> ClusteringConfig {
    ClusteringConfig {
        penalty: 1.0,
        ..ClusteringConfig::default()
    }
}

#[test]
fn status_scenario_on_four_node_path() {
    let bus = Arc::new(EventBus::new());
    let network = abcd(&bus);
    let mediator = Arc::new(RecordingMediator::default());
    let session = ClusteringSession::new(bus.as_ref(), mediator.clone())
        .with_algorithm(Arc::new(Precomputed(vec![vec!["A", "B", "C"]])));
    let mut store = NodeAttributes::new();

    let outcome = session
        .run(&network, &unit_penalty(), Some("weight"), Some(&mut store))
        .unwrap();
    let result = outcome.completed().expect("run should complete");

    assert_eq!(result.clusters.len(), 1);
    for (id, label) in [("A", "Cluster"), ("B", "Cluster"), ("C", "Cluster"), ("D", "Outlier")] {
        assert_eq!(
            store.get(id, ATTRIBUTE_STATUS),
            Some(&AttrValue::String(label.to_string())),
            "status of {id}"
        );
    }
    assert!(mediator.messages.lock().unwrap().is_empty());
}

#[test]
fn overlapping_results_are_labelled_overlap() {
    let bus = Arc::new(EventBus::new());
    let network = abcd(&bus);
    let session = ClusteringSession::new(bus.as_ref(), Arc::new(RecordingMediator::default()))
        .with_executor(InlineExecutor)
        .with_algorithm(Arc::new(Precomputed(vec![
            vec!["A", "B"],
            vec!["B", "C"],
            vec!["B", "C", "D"],
        ])));
    let mut store = NodeAttributes::new();

    session
        .run(&network, &unit_penalty(), None, Some(&mut store))
        .unwrap();

    let label = |id: &str| store.get(id, ATTRIBUTE_STATUS).cloned();
    assert_eq!(label("A"), Some(AttrValue::String("Cluster".into())));
    assert_eq!(label("B"), Some(AttrValue::String("Overlap".into())));
    assert_eq!(label("C"), Some(AttrValue::String("Overlap".into())));
    assert_eq!(label("D"), Some(AttrValue::String("Cluster".into())));
}

#[test]
fn non_numeric_weight_fails_conversion_and_leaves_cache_empty() {
    let bus = Arc::new(EventBus::new());
    let mut network = abcd(&bus);
    network.set_edge_attribute(1, "weight", AttrValue::String("high".into()));
    let mediator = Arc::new(RecordingMediator::default());
    let session = ClusteringSession::new(bus.as_ref(), mediator.clone());
    let mut store = NodeAttributes::new();

    let err = session
        .run(&network, &unit_penalty(), Some("weight"), Some(&mut store))
        .unwrap_err();

    assert!(matches!(err, EngineError::NonNumericAttribute { .. }));
    assert!(!session.cache().contains(network.handle()));
    assert_eq!(store.value_count(), 0);
    assert_eq!(mediator.messages.lock().unwrap().len(), 1);
}

#[test]
fn edgeless_network_produces_no_result_and_no_writes() {
    let bus = Arc::new(EventBus::new());
    let mut network = InMemoryNetwork::new("nodes-only").with_events(bus.clone());
    for id in ["A", "B", "C"] {
        network.add_node(id);
    }
    let mediator = Arc::new(RecordingMediator::default());
    let session = ClusteringSession::new(bus.as_ref(), mediator.clone());
    let mut store = NodeAttributes::new();

    let err = session
        .run(&network, &unit_penalty(), None, Some(&mut store))
        .unwrap_err();

    assert!(matches!(err, EngineError::EmptyGraph));
    assert_eq!(store.value_count(), 0);
    assert_eq!(
        *mediator.messages.lock().unwrap(),
        vec!["The selected network contains no edges".to_string()]
    );
}

#[test]
fn invalidate_then_convert_never_reuses_the_graph() {
    let bus = Arc::new(EventBus::new());
    let network = abcd(&bus);
    let session = ClusteringSession::new(bus.as_ref(), Arc::new(RecordingMediator::default()));

    let first = session.convert(&network, Some("weight")).unwrap();
    let hit = session.convert(&network, Some("weight")).unwrap();
    assert!(Arc::ptr_eq(&first, &hit));

    session.cache().invalidate(network.handle());
    let rebuilt = session.convert(&network, Some("weight")).unwrap();
    assert!(!Arc::ptr_eq(&first, &rebuilt));

    session.reset_cache();
    assert!(session.cache().is_empty());
}

#[test]
fn network_changes_reach_the_session_cache() {
    let bus = Arc::new(EventBus::new());
    let mut network = abcd(&bus);
    let session = ClusteringSession::new(bus.as_ref(), Arc::new(RecordingMediator::default()));

    let before = session.convert(&network, Some("weight")).unwrap();
    network.set_edge_attribute(0, "weight", AttrValue::Floating(4.0));
    let after = session.convert(&network, Some("weight")).unwrap();

    assert_eq!(before.edges()[0].weight, 1.0);
    assert_eq!(after.edges()[0].weight, 4.0);
}

#[test]
fn declined_retype_aborts_affinity_annotation() {
    let bus = Arc::new(EventBus::new());
    let network = abcd(&bus);
    let mediator = Arc::new(RecordingMediator::default());
    let session = ClusteringSession::new(bus.as_ref(), mediator.clone());
    let graph = session.convert(&network, Some("weight")).unwrap();
    let set = NodeSet::new(graph, [0, 1, 2]);

    let mut store = NodeAttributes::new();
    store.declare(ATTRIBUTE_AFFINITY, AttrType::String);

    let outcome = session
        .annotate_affinity(&set, &unit_penalty(), &mut store)
        .unwrap();

    assert_eq!(outcome, cohesion_cluster::cluster::AnnotationOutcome::Declined);
    assert_eq!(store.attribute_type(ATTRIBUTE_AFFINITY), Some(AttrType::String));
    assert_eq!(store.value_count(), 0);
    assert_eq!(mediator.questions.lock().unwrap().len(), 1);
}

#[test]
fn affinity_scenario_on_four_node_path() {
    let bus = Arc::new(EventBus::new());
    let network = abcd(&bus);
    let session = ClusteringSession::new(
        bus.as_ref(),
        Arc::new(RecordingMediator {
            answer: true,
            ..RecordingMediator::default()
        }),
    );
    let graph = session.convert(&network, Some("weight")).unwrap();
    let set = NodeSet::new(graph, [0, 1, 2]);
    let mut store = NodeAttributes::new();

    session
        .annotate_affinity(&set, &unit_penalty(), &mut store)
        .unwrap();

    let affinity = |id: &str| match store.get(id, ATTRIBUTE_AFFINITY) {
        Some(AttrValue::Floating(value)) => *value,
        other => panic!("no affinity for {id}: {other:?}"),
    };
    // B holds the cluster together; D would raise the quality from 0.5 to 0.75
    assert!((affinity("B") - 0.5).abs() < 1e-9);
    assert!((affinity("D") - 0.25).abs() < 1e-9);
    assert!(affinity("B") > affinity("A"));
}

#[test]
fn cohesiveness_of_known_set() {
    // Triangle A–B–C (internal 3.0) with a single outgoing edge C–D (boundary 1.0)
    let bus = Arc::new(EventBus::new());
    let mut network = abcd(&bus);
    network.add_edge("A", "C", weight(AttrValue::Floating(1.0)));
    let session = ClusteringSession::new(bus.as_ref(), Arc::new(RecordingMediator::default()));
    let graph = session.convert(&network, Some("weight")).unwrap();

    let set = MutableNodeSet::from_members(graph.clone(), ["A", "B", "C"].map(|id| graph.index_of(id).unwrap()));
    assert_eq!(set.internal_weight(), 3.0);
    assert_eq!(set.boundary_weight(), 1.0);

    let quality = CohesivenessFunction::new(1.0);
    assert!((quality.calculate(&set) - 0.6).abs() < 1e-9);
}

#[test]
fn greedy_growth_on_a_worker_thread() {
    let bus = Arc::new(EventBus::new());
    let mut network = InMemoryNetwork::new("two-cliques").with_events(bus.clone());
    for (a, b) in [("a", "b"), ("b", "c"), ("a", "c"), ("c", "d"), ("d", "e"), ("e", "f"), ("d", "f")] {
        let w = if (a, b) == ("c", "d") { 0.1 } else { 1.0 };
        network.add_edge(a, b, weight(AttrValue::Floating(w)));
    }
    let session = ClusteringSession::new(bus.as_ref(), Arc::new(RecordingMediator::default()))
        .with_executor(ThreadExecutor)
        .with_algorithm(Arc::new(GreedyGrowth));

    let result = match session.run(&network, &unit_penalty(), Some("weight"), None).unwrap() {
        RunOutcome::Completed(result) => result,
        RunOutcome::Cancelled => panic!("run was not cancelled"),
    };

    assert_eq!(result.clusters.len(), 2);
    assert!(result.status.is_none());
    for cluster in &result.clusters {
        assert_eq!(cluster.len(), 3);
        assert!(cluster.quality > 0.7);
    }
}
