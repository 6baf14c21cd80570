use std::sync::Arc;
use parking_lot::Mutex;
use ahash::AHashMap;

/// In-process event bus for host view changes
pub struct EventBus {
    handlers: Arc<Mutex<AHashMap<std::any::TypeId, Vec<Box<dyn EventHandler>>>>>,
}

/// Event trait that all events must implement
pub trait Event: Send + Sync + 'static {
    fn as_any(&self) -> &dyn std::any::Any;
}

/// Handler trait for event handlers
pub trait EventHandler: Send + Sync {
    fn handle(&mut self, event: &dyn Event);
}

/// Host view events
pub mod events {
    use super::Event;
    use crate::state::ViewState;

    /// The full host collection was replaced
    #[derive(Debug, Clone)]
    pub struct HostsReplaced {
        pub host_count: usize,
        pub collection_version: u64,
    }

    /// The marker cache was rebuilt for a new collection
    #[derive(Debug, Clone)]
    pub struct MarkersRegenerated {
        pub marker_count: usize,
        pub collection_version: u64,
    }

    /// Search, sort or active view changed
    #[derive(Debug, Clone)]
    pub struct ViewStateChanged {
        pub state: ViewState,
        pub visible_hosts: usize,
    }

    macro_rules! impl_event {
        ($($t:ty),*) => {
            $(
                impl Event for $t {
                    fn as_any(&self) -> &dyn std::any::Any {
                        self
                    }
                }
            )*
        }
    }

    impl_event!(
        HostsReplaced,
        MarkersRegenerated,
        ViewStateChanged
    );
}

impl EventBus {
    /// Create a new event bus
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(Mutex::new(AHashMap::new())),
        }
    }

    /// Subscribe to events of a specific type
    pub fn subscribe<E: Event>(&self, handler: Box<dyn EventHandler>) {
        let type_id = std::any::TypeId::of::<E>();
        let mut handlers = self.handlers.lock();
        handlers.entry(type_id).or_insert_with(Vec::new).push(handler);
    }

    /// Publish an event to every handler subscribed to its type.
    ///
    /// Handlers run without the bus lock held, so they may publish or
    /// subscribe on the same bus. Handlers subscribed during a publish start
    /// receiving events from the next one.
    pub fn publish<E: Event>(&self, event: E) {
        let type_id = std::any::TypeId::of::<E>();

        let mut running = match self.handlers.lock().get_mut(&type_id) {
            Some(event_handlers) => std::mem::take(event_handlers),
            None => return,
        };

        tracing::trace!(
            event = std::any::type_name::<E>(),
            handlers = running.len(),
            "publishing event"
        );
        for handler in running.iter_mut() {
            handler.handle(&event);
        }

        let mut handlers = self.handlers.lock();
        let slot = handlers.entry(type_id).or_default();
        running.append(slot);
        *slot = running;
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Event handler backed by a closure
pub struct ClosureEventHandler<F> {
    handler: F,
}

impl<F> EventHandler for ClosureEventHandler<F>
where
    F: FnMut(&dyn Event) + Send + Sync,
{
    fn handle(&mut self, event: &dyn Event) {
        (self.handler)(event);
    }
}

/// Create an event handler from a closure
pub fn handler_from_fn<F>(f: F) -> Box<dyn EventHandler>
where
    F: FnMut(&dyn Event) + Send + Sync + 'static,
{
    Box::new(ClosureEventHandler { handler: f })
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::events::{HostsReplaced, MarkersRegenerated};

    #[test]
    fn test_publish_reaches_only_matching_subscribers() {
        let bus = EventBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = seen.clone();
        bus.subscribe::<HostsReplaced>(handler_from_fn(move |event| {
            if let Some(e) = event.as_any().downcast_ref::<HostsReplaced>() {
                sink.lock().push(e.host_count);
            }
        }));

        bus.publish(HostsReplaced { host_count: 3, collection_version: 1 });
        bus.publish(MarkersRegenerated { marker_count: 3, collection_version: 1 });
        bus.publish(HostsReplaced { host_count: 5, collection_version: 2 });

        assert_eq!(*seen.lock(), vec![3, 5]);
    }

    #[test]
    fn test_handler_can_publish_and_subscribe_on_same_bus() {
        let bus = Arc::new(EventBus::new());
        let seen = Arc::new(Mutex::new(Vec::new()));

        let inner = bus.clone();
        let sink = seen.clone();
        bus.subscribe::<HostsReplaced>(handler_from_fn(move |event| {
            if let Some(e) = event.as_any().downcast_ref::<HostsReplaced>() {
                sink.lock().push(format!("hosts {}", e.host_count));
                inner.publish(MarkersRegenerated {
                    marker_count: e.host_count,
                    collection_version: e.collection_version,
                });
                let late_sink = sink.clone();
                inner.subscribe::<HostsReplaced>(handler_from_fn(move |_| {
                    late_sink.lock().push("late".to_string());
                }));
            }
        }));

        let sink = seen.clone();
        bus.subscribe::<MarkersRegenerated>(handler_from_fn(move |event| {
            if let Some(e) = event.as_any().downcast_ref::<MarkersRegenerated>() {
                sink.lock().push(format!("markers {}", e.marker_count));
            }
        }));

        bus.publish(HostsReplaced { host_count: 2, collection_version: 1 });
        assert_eq!(*seen.lock(), vec!["hosts 2", "markers 2"]);

        bus.publish(HostsReplaced { host_count: 4, collection_version: 2 });
        assert_eq!(
            *seen.lock(),
            vec!["hosts 2", "markers 2", "hosts 4", "markers 4", "late"]
        );
    }
}
