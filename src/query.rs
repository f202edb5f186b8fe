//! Read-only access to forwarded events.
use std::sync::Arc;

use tracing::debug;

use crate::Event;
use crate::EventFilter;
use crate::EventSink;
use crate::QueryError;
use crate::Result;

/// Serves event reads straight from the event sink; it holds no state of
/// its own and never touches the watches.
pub struct EventQuery<K: EventSink> {
    sink: Arc<K>,
}

impl<K: EventSink> EventQuery<K> {
    pub fn new(sink: Arc<K>) -> Self {
        Self { sink }
    }

    /// Events of `namespace`, newest `last_seen` first, at most `limit`.
    ///
    /// `type_filter` narrows the result to one event type ("Warning",
    /// "Normal", ...). `None` or an empty string means every type. A
    /// non-positive `limit` is rejected without reading storage.
    pub async fn get_events(
        &self,
        namespace: &str,
        type_filter: Option<&str>,
        limit: i64,
    ) -> Result<Vec<Event>> {
        if limit <= 0 {
            return Err(QueryError::InvalidLimit(limit).into());
        }

        let filter = EventFilter::new(namespace, type_filter, limit);
        debug!(?filter, "querying events");
        self.sink.query(filter).await
    }
}
