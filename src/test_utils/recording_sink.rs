use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::select_events;
use crate::Event;
use crate::EventFilter;
use crate::EventSink;
use crate::Result;
use crate::StorageError;

/// Keeps every saved event in arrival order; saves can be made to fail.
#[derive(Debug, Default)]
pub struct RecordingEventSink {
    saved: Mutex<Vec<Event>>,
    save_calls: AtomicUsize,
    failing: AtomicBool,
}

impl RecordingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Saved events in the order `save` was called.
    pub fn saved(&self) -> Vec<Event> {
        self.saved.lock().clone()
    }

    pub fn saved_ids(&self) -> Vec<String> {
        self.saved.lock().iter().map(|e| e.id.clone()).collect()
    }

    /// Calls to `save`, failed ones included.
    pub fn save_calls(&self) -> usize {
        self.save_calls.load(Ordering::SeqCst)
    }

    pub fn fail_saves(
        &self,
        failing: bool,
    ) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl EventSink for RecordingEventSink {
    async fn save(
        &self,
        event: &Event,
    ) -> Result<()> {
        self.save_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(StorageError::DbError("injected save failure".to_string()).into());
        }
        self.saved.lock().push(event.clone());
        Ok(())
    }

    async fn query(
        &self,
        filter: EventFilter,
    ) -> Result<Vec<Event>> {
        let candidates = self.saved.lock().clone();
        select_events(candidates, &filter)
    }
}
