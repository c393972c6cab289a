//! Session-scoped cache of graphs converted from external networks

use std::sync::Arc;

use dashmap::DashMap;

use crate::error::Result;
use crate::graph::builder::GraphBuilder;
use crate::graph::WeightedGraph;
use crate::network::events::{EventSource, NetworkEvent, NetworkListener};
use crate::network::{Network, NetworkHandle};

/// A converted graph and the weight attribute it was built with
#[derive(Debug, Clone)]
struct CacheEntry {
    graph: Arc<WeightedGraph>,
    weight_attr: Option<String>,
}

/// Memoizes network-to-graph conversion per network handle.
///
/// Entries are evicted by [`invalidate`](Self::invalidate), either called
/// directly or triggered by a change notification when the cache was created
/// with [`subscribed_to`](Self::subscribed_to). A failed conversion never
/// leaves an entry behind.
#[derive(Debug, Default)]
pub struct GraphCache {
    entries: DashMap<NetworkHandle, CacheEntry>,
}

impl GraphCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cache that invalidates entries on events from `source`
    pub fn subscribed_to(source: &dyn EventSource) -> Arc<Self> {
        let cache = Arc::new(Self::new());
        source.subscribe(cache.clone());
        cache
    }

    /// Return the cached graph for `network`, converting it on a miss.
    ///
    /// An entry built with a different weight attribute counts as a miss and
    /// is replaced.
    pub fn convert(&self, network: &dyn Network, weight_attr: Option<&str>) -> Result<Arc<WeightedGraph>> {
        let handle = network.handle();

        if let Some(entry) = self.entries.get(&handle) {
            if entry.weight_attr.as_deref() == weight_attr {
                log::debug!("Graph cache hit for network {:?}", handle);
                return Ok(Arc::clone(&entry.graph));
            }
        }

        log::debug!(
            "Graph cache miss for network {:?} (weight attribute {:?})",
            handle,
            weight_attr
        );
        let graph = Arc::new(GraphBuilder::from_network(network, weight_attr)?);
        self.entries.insert(
            handle,
            CacheEntry {
                graph: Arc::clone(&graph),
                weight_attr: weight_attr.map(str::to_string),
            },
        );
        Ok(graph)
    }

    /// Evict the entry for `handle`, if any
    pub fn invalidate(&self, handle: NetworkHandle) {
        if self.entries.remove(&handle).is_some() {
            log::debug!("Invalidated cached graph for network {:?}", handle);
        }
    }

    /// Evict every entry
    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn contains(&self, handle: NetworkHandle) -> bool {
        self.entries.contains_key(&handle)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl NetworkListener for GraphCache {
    fn on_event(&self, event: &NetworkEvent) {
        self.invalidate(event.handle());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::AttrValue;
    use crate::error::EngineError;
    use crate::network::events::EventBus;
    use crate::network::InMemoryNetwork;
    use std::collections::HashMap;

    fn path_network(bus: Option<Arc<EventBus>>) -> InMemoryNetwork {
        let mut network = InMemoryNetwork::new("path");
        if let Some(bus) = bus {
            network = network.with_events(bus);
        }
        network.add_edge("A", "B", HashMap::new());
        network.add_edge("B", "C", HashMap::new());
        network
    }

    #[test]
    fn hit_returns_the_same_graph() {
        let cache = GraphCache::new();
        let network = path_network(None);

        let first = cache.convert(&network, None).unwrap();
        let second = cache.convert(&network, None).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn invalidate_forces_a_fresh_graph() {
        let cache = GraphCache::new();
        let network = path_network(None);

        let first = cache.convert(&network, None).unwrap();
        cache.invalidate(network.handle());
        cache.invalidate(network.handle());
        assert!(!cache.contains(network.handle()));

        let second = cache.convert(&network, None).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(first.edge_count(), second.edge_count());
    }

    #[test]
    fn other_weight_attribute_rebuilds() {
        let cache = GraphCache::new();
        let network = path_network(None);

        let unweighted = cache.convert(&network, None).unwrap();
        let weighted = cache.convert(&network, Some("weight")).unwrap();
        assert!(!Arc::ptr_eq(&unweighted, &weighted));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn failed_conversion_leaves_cache_empty() {
        let cache = GraphCache::new();
        let mut network = path_network(None);
        network.set_edge_attribute(0, "weight", AttrValue::String("high".into()));

        let err = cache.convert(&network, Some("weight")).unwrap_err();
        assert!(matches!(err, EngineError::NonNumericAttribute { .. }));
        assert!(!cache.contains(network.handle()));
        assert!(cache.is_empty());
    }

    #[test]
    fn events_invalidate_entries() {
        let bus = Arc::new(EventBus::new());
        let cache = GraphCache::subscribed_to(bus.as_ref());
        let mut network = path_network(Some(bus.clone()));

        let before = cache.convert(&network, None).unwrap();
        network.add_edge("C", "D", HashMap::new());
        assert!(!cache.contains(network.handle()));

        let after = cache.convert(&network, None).unwrap();
        assert_eq!(before.edge_count(), 2);
        assert_eq!(after.edge_count(), 3);

        let handle = network.handle();
        network.destroy();
        assert!(!cache.contains(handle));
    }

    #[test]
    fn clear_resets_everything() {
        let cache = GraphCache::new();
        let a = path_network(None);
        let b = path_network(None);
        cache.convert(&a, None).unwrap();
        cache.convert(&b, None).unwrap();
        assert_eq!(cache.len(), 2);

        cache.clear();
        assert!(cache.is_empty());
    }
}
