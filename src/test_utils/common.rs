use std::time::Duration;

use chrono::TimeZone;
use chrono::Utc;
use tokio::time::sleep;
use tokio::time::Instant;

use crate::Event;
use crate::RawEvent;

/// An event in `namespace` whose `last_seen` is `last_seen_secs` after the
/// epoch.
pub fn build_event(
    namespace: &str,
    id: &str,
    event_type: &str,
    last_seen_secs: i64,
) -> Event {
    let last_seen = Utc.timestamp_opt(last_seen_secs, 0).single();
    Event {
        id: id.to_string(),
        namespace: namespace.to_string(),
        name: format!("{id}.event"),
        reason: "Scheduled".to_string(),
        message: format!("message of {id}"),
        event_type: event_type.to_string(),
        involved_object: format!("Pod/{id}"),
        first_seen: last_seen,
        last_seen,
        count: 1,
    }
}

/// A well-formed upstream item with uid `uid`.
pub fn raw_event(
    uid: &str,
    event_type: &str,
    count: i32,
) -> RawEvent {
    RawEvent {
        uid: Some(uid.to_string()),
        name: Some(format!("{uid}.event")),
        reason: Some("BackOff".to_string()),
        message: Some(format!("message of {uid}")),
        event_type: Some(event_type.to_string()),
        involved_kind: Some("Pod".to_string()),
        involved_name: Some(uid.to_string()),
        last_timestamp: Utc.timestamp_opt(1_700_000_000 + i64::from(count), 0).single(),
        count: Some(count),
        ..Default::default()
    }
}

/// Polls `condition` every few milliseconds until it holds or `timeout`
/// elapses. Returns the last evaluation.
pub async fn wait_until<F>(
    timeout: Duration,
    mut condition: F,
) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = Instant::now() + timeout;
    loop {
        if condition() {
            return true;
        }
        if Instant::now() >= deadline {
            return condition();
        }
        sleep(Duration::from_millis(5)).await;
    }
}

static LOGGER_INIT: once_cell::sync::Lazy<()> = once_cell::sync::Lazy::new(|| {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
});

pub fn enable_logger() {
    *LOGGER_INIT;
    println!("setup logger for unit test.");
}
