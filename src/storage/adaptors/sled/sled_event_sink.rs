use std::sync::Arc;

use async_trait::async_trait;
use tracing::error;
use tracing::trace;

use crate::constants::EVENTS_TREE;
use crate::constants::EVENT_KEY_SEPARATOR;
use crate::select_events;
use crate::Event;
use crate::EventFilter;
use crate::EventSink;
use crate::Result;

/// Event store keyed by `namespace \0 id`, so a namespace's events share a
/// key prefix and re-deliveries of the same id overwrite each other.
#[derive(Clone)]
pub struct SledEventSink {
    db: Arc<::sled::Db>,
    tree: ::sled::Tree,
}

impl std::fmt::Debug for SledEventSink {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("SledEventSink")
            .field("tree_len", &self.tree.len())
            .finish()
    }
}

impl SledEventSink {
    pub fn new(db: Arc<::sled::Db>) -> Result<Self> {
        let tree = db.open_tree(EVENTS_TREE)?;
        Ok(Self { db, tree })
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Synchronously flushes the whole database. Used on shutdown.
    pub fn flush(&self) -> Result<usize> {
        Ok(self.db.flush()?)
    }
}

fn namespace_prefix(namespace: &str) -> Vec<u8> {
    let mut prefix = Vec::with_capacity(namespace.len() + 1);
    prefix.extend_from_slice(namespace.as_bytes());
    prefix.push(EVENT_KEY_SEPARATOR);
    prefix
}

pub(crate) fn event_key(
    namespace: &str,
    id: &str,
) -> Vec<u8> {
    let mut key = namespace_prefix(namespace);
    key.extend_from_slice(id.as_bytes());
    key
}

#[async_trait]
impl EventSink for SledEventSink {
    async fn save(
        &self,
        event: &Event,
    ) -> Result<()> {
        let value = bincode::serialize(event)?;
        self.tree.insert(event_key(&event.namespace, &event.id), value)?;
        trace!(namespace = %event.namespace, id = %event.id, "event stored");
        Ok(())
    }

    async fn query(
        &self,
        filter: EventFilter,
    ) -> Result<Vec<Event>> {
        filter.validated_limit()?;

        let mut candidates = Vec::new();
        for item in self.tree.scan_prefix(namespace_prefix(&filter.namespace)) {
            let (key, value) = item?;
            match bincode::deserialize::<Event>(&value) {
                Ok(event) => candidates.push(event),
                Err(e) => {
                    error!(
                        "skip undecodable event record {:?}: {:?}",
                        String::from_utf8_lossy(&key),
                        e
                    );
                }
            }
        }

        select_events(candidates, &filter)
    }
}
