//! Cluster events as the watcher forwards and stores them.

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use crate::Result;
use crate::SourceError;

/// One occurrence reported by the cluster, e.g. a failed scheduling attempt
/// or a container restart. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Source-assigned identifier; stable across re-deliveries of the same
    /// occurrence with updated `count` / `last_seen`
    pub id: String,
    pub namespace: String,
    pub name: String,
    pub reason: String,
    pub message: String,
    /// "Normal", "Warning", ...
    pub event_type: String,
    /// Flattened as `"<Kind>/<Name>"`
    pub involved_object: String,
    pub first_seen: Option<DateTime<Utc>>,
    pub last_seen: Option<DateTime<Utc>>,
    pub count: u32,
}

/// An upstream item before translation. Every field is optional because
/// the source does not guarantee any of them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEvent {
    pub uid: Option<String>,
    pub namespace: Option<String>,
    pub name: Option<String>,
    pub reason: Option<String>,
    pub message: Option<String>,
    pub event_type: Option<String>,
    pub involved_kind: Option<String>,
    pub involved_name: Option<String>,
    pub first_timestamp: Option<DateTime<Utc>>,
    pub last_timestamp: Option<DateTime<Utc>>,
    pub deletion_timestamp: Option<DateTime<Utc>>,
    pub count: Option<i32>,
}

impl Event {
    /// Translates an upstream item received on the watch of `watched_namespace`.
    ///
    /// Items without an identifier or a name are rejected as malformed.
    pub fn from_raw(
        watched_namespace: &str,
        raw: RawEvent,
    ) -> Result<Self> {
        let id = non_empty(raw.uid).ok_or_else(|| SourceError::MalformedEvent("missing uid".into()))?;
        let name = non_empty(raw.name)
            .ok_or_else(|| SourceError::MalformedEvent(format!("event {id} has no name")))?;

        let involved_object = format!(
            "{}/{}",
            raw.involved_kind.unwrap_or_default(),
            raw.involved_name.unwrap_or_default()
        );

        // A deletion marks the end of the occurrence and wins over the
        // source's own last-seen value.
        let last_seen = raw
            .deletion_timestamp
            .or(raw.last_timestamp)
            .or(raw.first_timestamp);

        Ok(Event {
            id,
            namespace: non_empty(raw.namespace).unwrap_or_else(|| watched_namespace.to_string()),
            name,
            reason: raw.reason.unwrap_or_default(),
            message: raw.message.unwrap_or_default(),
            event_type: raw.event_type.unwrap_or_default(),
            involved_object,
            first_seen: raw.first_timestamp,
            last_seen,
            count: raw.count.map(|c| c.max(1) as u32).unwrap_or(1),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
