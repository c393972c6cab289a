//! Change notifications for externally owned networks

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;

use crate::network::NetworkHandle;

/// Notification that a network changed or went away
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkEvent {
    Modified(NetworkHandle),
    Destroyed(NetworkHandle),
}

impl NetworkEvent {
    pub fn handle(&self) -> NetworkHandle {
        match self {
            NetworkEvent::Modified(handle) | NetworkEvent::Destroyed(handle) => *handle,
        }
    }
}

/// Receiver of network change notifications
pub trait NetworkListener: Send + Sync {
    fn on_event(&self, event: &NetworkEvent);
}

/// Identifies one subscription on an event source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Something that emits network events to registered listeners
pub trait EventSource {
    fn subscribe(&self, listener: Arc<dyn NetworkListener>) -> SubscriptionId;

    fn unsubscribe(&self, id: SubscriptionId);
}

/// Synchronous in-process event source: `publish` calls every listener
/// before returning.
#[derive(Default)]
pub struct EventBus {
    next_id: AtomicU64,
    listeners: DashMap<SubscriptionId, Arc<dyn NetworkListener>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, event: NetworkEvent) {
        log::debug!("Publishing {:?} to {} listeners", event, self.listeners.len());

        // Collect first so listeners may (un)subscribe while being notified
        let listeners: Vec<Arc<dyn NetworkListener>> = self
            .listeners
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();

        for listener in listeners {
            listener.on_event(&event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl EventSource for EventBus {
    fn subscribe(&self, listener: Arc<dyn NetworkListener>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners.insert(id, listener);
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.listeners.remove(&id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<NetworkEvent>>,
    }

    impl NetworkListener for Recorder {
        fn on_event(&self, event: &NetworkEvent) {
            self.seen.lock().unwrap().push(*event);
        }
    }

    #[test]
    fn publish_reaches_subscribers_until_unsubscribed() {
        let bus = EventBus::new();
        let recorder = Arc::new(Recorder::default());
        let id = bus.subscribe(recorder.clone());

        let handle = NetworkHandle::next();
        bus.publish(NetworkEvent::Modified(handle));
        bus.unsubscribe(id);
        bus.publish(NetworkEvent::Destroyed(handle));

        let seen = recorder.seen.lock().unwrap();
        assert_eq!(*seen, vec![NetworkEvent::Modified(handle)]);
        assert_eq!(bus.listener_count(), 0);
    }
}
