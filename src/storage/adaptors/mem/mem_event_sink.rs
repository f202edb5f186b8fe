use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::select_events;
use crate::Event;
use crate::EventFilter;
use crate::EventSink;
use crate::Result;

/// In-memory event store keyed by `(namespace, id)`.
#[derive(Debug, Default)]
pub struct MemEventSink {
    events: RwLock<HashMap<(String, String), Event>>,
}

impl MemEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }
}

#[async_trait]
impl EventSink for MemEventSink {
    async fn save(
        &self,
        event: &Event,
    ) -> Result<()> {
        self.events
            .write()
            .insert((event.namespace.clone(), event.id.clone()), event.clone());
        Ok(())
    }

    async fn query(
        &self,
        filter: EventFilter,
    ) -> Result<Vec<Event>> {
        filter.validated_limit()?;

        let candidates: Vec<Event> = self
            .events
            .read()
            .values()
            .filter(|e| e.namespace == filter.namespace)
            .cloned()
            .collect();

        select_events(candidates, &filter)
    }
}
