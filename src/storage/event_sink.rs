//! Append-only event store contract and the filtering rules every adaptor
//! shares.
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::Event;
use crate::QueryError;
use crate::Result;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait EventSink: Send + Sync + 'static {
    /// Stores one event. Saving an id that is already stored replaces the
    /// previous record instead of failing.
    async fn save(
        &self,
        event: &Event,
    ) -> Result<()>;

    /// Events of `filter.namespace`, newest `last_seen` first, at most
    /// `filter.limit` of them. A non-positive limit is rejected.
    async fn query(
        &self,
        filter: EventFilter,
    ) -> Result<Vec<Event>>;
}

/// Read request against an [`EventSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventFilter {
    pub namespace: String,
    /// Matched case-insensitively against `Event::event_type`
    pub event_type: Option<String>,
    pub limit: i64,
}

impl EventFilter {
    /// An empty `event_type` means "any type".
    pub fn new(
        namespace: impl Into<String>,
        event_type: Option<&str>,
        limit: i64,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            event_type: event_type.filter(|t| !t.is_empty()).map(str::to_string),
            limit,
        }
    }

    pub fn validated_limit(&self) -> Result<usize> {
        if self.limit <= 0 {
            return Err(QueryError::InvalidLimit(self.limit).into());
        }
        Ok(usize::try_from(self.limit).unwrap_or(usize::MAX))
    }

    pub fn matches(
        &self,
        event: &Event,
    ) -> bool {
        event.namespace == self.namespace
            && self
                .event_type
                .as_deref()
                .map_or(true, |t| t.eq_ignore_ascii_case(&event.event_type))
    }
}

/// Applies `filter` to a candidate set: type filter, newest first, limit.
pub(crate) fn select_events(
    candidates: impl IntoIterator<Item = Event>,
    filter: &EventFilter,
) -> Result<Vec<Event>> {
    let limit = filter.validated_limit()?;

    let mut selected: Vec<Event> = candidates.into_iter().filter(|e| filter.matches(e)).collect();
    selected.sort_by(|a, b| b.last_seen.cmp(&a.last_seen).then_with(|| a.id.cmp(&b.id)));
    selected.truncate(limit);

    Ok(selected)
}
