use dashmap::DashMap;
use uuid::Uuid;

use crate::state::event::Event;

/// Abstraction over the keyed collection of event aggregates.
///
/// The engine reads and rewrites whole aggregates with no versioning, so the
/// backing store only needs get/upsert/remove semantics. Callers are expected
/// to serialize writes per event id; see the per-event gates in `AppState`.
pub trait EventRegistry: Send + Sync {
    /// Fetch a copy of the event aggregate, if present.
    fn get(&self, id: Uuid) -> Option<Event>;

    /// Insert or replace the event aggregate.
    fn upsert(&self, event: Event);

    /// Remove the event, returning whether it existed.
    fn remove(&self, id: Uuid) -> bool;

    /// Whether the event is present.
    fn contains(&self, id: Uuid) -> bool;
}

/// Default in-memory registry backed by a concurrent map.
#[derive(Default)]
pub struct InMemoryEventRegistry {
    events: DashMap<Uuid, Event>,
}

impl InMemoryEventRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventRegistry for InMemoryEventRegistry {
    fn get(&self, id: Uuid) -> Option<Event> {
        self.events.get(&id).map(|entry| entry.value().clone())
    }

    fn upsert(&self, event: Event) {
        self.events.insert(event.id, event);
    }

    fn remove(&self, id: Uuid) -> bool {
        self.events.remove(&id).is_some()
    }

    fn contains(&self, id: Uuid) -> bool {
        self.events.contains_key(&id)
    }
}
