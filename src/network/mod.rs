//! The externally owned, mutable network the engine reads graphs from

pub mod events;

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::attributes::AttrValue;
use events::{EventBus, NetworkEvent};

static NEXT_HANDLE: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of an external network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NetworkHandle(u64);

impl NetworkHandle {
    /// Allocate a fresh handle
    pub fn next() -> Self {
        NetworkHandle(NEXT_HANDLE.fetch_add(1, Ordering::Relaxed))
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Borrowed view of one edge of a network
#[derive(Debug, Clone, Copy)]
pub struct EdgeView<'a> {
    pub id: usize,
    pub source: &'a str,
    pub target: &'a str,
    pub attributes: &'a HashMap<String, AttrValue>,
}

impl<'a> EdgeView<'a> {
    pub fn attribute(&self, name: &str) -> Option<&'a AttrValue> {
        self.attributes.get(name)
    }
}

/// Read access to a network owned outside the engine
pub trait Network {
    fn handle(&self) -> NetworkHandle;

    /// Node identifiers in the network's own enumeration order
    fn node_ids(&self) -> Box<dyn Iterator<Item = &str> + '_>;

    fn edges(&self) -> Box<dyn Iterator<Item = EdgeView<'_>> + '_>;
}

/// One stored edge with its attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub attributes: HashMap<String, AttrValue>,
}

/// Mutable in-memory network that announces every change on an event bus
pub struct InMemoryNetwork {
    handle: NetworkHandle,
    name: String,
    nodes: Vec<String>,
    known: HashSet<String>,
    edges: Vec<EdgeRecord>,
    events: Option<Arc<EventBus>>,
}

impl std::fmt::Debug for InMemoryNetwork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryNetwork")
            .field("handle", &self.handle)
            .field("name", &self.name)
            .field("nodes", &self.nodes)
            .field("edges", &self.edges)
            .finish_non_exhaustive()
    }
}

impl InMemoryNetwork {
    pub fn new(name: &str) -> Self {
        Self {
            handle: NetworkHandle::next(),
            name: name.to_string(),
            nodes: Vec::new(),
            known: HashSet::new(),
            edges: Vec::new(),
            events: None,
        }
    }

    /// Publish change notifications for this network on `bus`
    pub fn with_events(mut self, bus: Arc<EventBus>) -> Self {
        self.events = Some(bus);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn edge(&self, id: usize) -> Option<&EdgeRecord> {
        self.edges.get(id)
    }

    /// Add a node; returns false when it already existed
    pub fn add_node(&mut self, id: &str) -> bool {
        let added = self.insert_node(id);
        if added {
            self.notify(NetworkEvent::Modified(self.handle));
        }
        added
    }

    /// Add an edge, creating missing endpoints. Returns the new edge id.
    pub fn add_edge(
        &mut self,
        source: &str,
        target: &str,
        attributes: HashMap<String, AttrValue>,
    ) -> usize {
        self.insert_node(source);
        self.insert_node(target);
        self.edges.push(EdgeRecord {
            source: source.to_string(),
            target: target.to_string(),
            attributes,
        });
        self.notify(NetworkEvent::Modified(self.handle));
        self.edges.len() - 1
    }

    /// Set an attribute on an existing edge; returns false for unknown ids
    pub fn set_edge_attribute(&mut self, edge: usize, name: &str, value: AttrValue) -> bool {
        let Some(record) = self.edges.get_mut(edge) else {
            return false;
        };
        record.attributes.insert(name.to_string(), value);
        self.notify(NetworkEvent::Modified(self.handle));
        true
    }

    /// Remove an edge. Ids of later edges shift down by one.
    pub fn remove_edge(&mut self, edge: usize) -> Option<EdgeRecord> {
        if edge >= self.edges.len() {
            return None;
        }
        let record = self.edges.remove(edge);
        self.notify(NetworkEvent::Modified(self.handle));
        Some(record)
    }

    /// Drop the network, announcing its destruction
    pub fn destroy(self) {
        log::debug!("Destroying network '{}' ({:?})", self.name, self.handle);
        self.notify(NetworkEvent::Destroyed(self.handle));
    }

    fn insert_node(&mut self, id: &str) -> bool {
        if self.known.contains(id) {
            return false;
        }
        self.known.insert(id.to_string());
        self.nodes.push(id.to_string());
        true
    }

    fn notify(&self, event: NetworkEvent) {
        if let Some(bus) = &self.events {
            bus.publish(event);
        }
    }
}

impl Network for InMemoryNetwork {
    fn handle(&self) -> NetworkHandle {
        self.handle
    }

    fn node_ids(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        Box::new(self.nodes.iter().map(String::as_str))
    }

    fn edges(&self) -> Box<dyn Iterator<Item = EdgeView<'_>> + '_> {
        Box::new(self.edges.iter().enumerate().map(|(id, record)| EdgeView {
            id,
            source: &record.source,
            target: &record.target,
            attributes: &record.attributes,
        }))
    }
}
