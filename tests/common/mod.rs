use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::TimeZone;
use chrono::Utc;
use eventwatch::init_sled_db;
use eventwatch::EventSource;
use eventwatch::RawEvent;
use eventwatch::RawEventStream;
use eventwatch::ReconnectPolicy;
use eventwatch::Result;
use eventwatch::SledEventSink;
use eventwatch::SledNamespaceRegistry;
use eventwatch::SourceError;
use eventwatch::TypeConfig;
use eventwatch::WatchManager;
use futures::StreamExt;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::time::sleep;
use tokio::time::Instant;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_util::sync::CancellationToken;

pub const WAIT: Duration = Duration::from_secs(3);

/// Sled storage with an in-process event source.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Ord, PartialOrd)]
pub struct SledStubTypeConfig;

impl TypeConfig for SledStubTypeConfig {
    type R = SledNamespaceRegistry;

    type K = SledEventSink;

    type S = ChannelEventSource;
}

/// Event source whose streams are fed by the test through `emit` and
/// ended through `hang_up`.
#[derive(Default)]
pub struct ChannelEventSource {
    feeds: Mutex<HashMap<String, mpsc::UnboundedSender<Result<RawEvent>>>>,
    refuse: Mutex<Vec<String>>,
}

impl ChannelEventSource {
    pub fn emit(
        &self,
        namespace: &str,
        raw: RawEvent,
    ) -> bool {
        match self.feeds.lock().get(namespace) {
            Some(feed) => feed.send(Ok(raw)).is_ok(),
            None => false,
        }
    }

    pub fn hang_up(
        &self,
        namespace: &str,
    ) {
        self.feeds.lock().remove(namespace);
    }

    /// Makes every subscribe for `namespace` fail.
    pub fn refuse(
        &self,
        namespace: &str,
    ) {
        self.refuse.lock().push(namespace.to_string());
    }

    pub fn is_streaming(
        &self,
        namespace: &str,
    ) -> bool {
        self.feeds
            .lock()
            .get(namespace)
            .map(|feed| !feed.is_closed())
            .unwrap_or(false)
    }
}

#[async_trait]
impl EventSource for ChannelEventSource {
    async fn subscribe(
        &self,
        namespace: &str,
        cancel: CancellationToken,
    ) -> Result<RawEventStream> {
        if self.refuse.lock().iter().any(|ns| ns == namespace) {
            return Err(SourceError::Subscribe {
                namespace: namespace.to_string(),
                source: "namespaces \"missing\" not found".into(),
            }
            .into());
        }

        let (tx, rx) = mpsc::unbounded_channel();
        self.feeds.lock().insert(namespace.to_string(), tx);
        Ok(UnboundedReceiverStream::new(rx)
            .take_until(async move { cancel.cancelled().await })
            .boxed())
    }
}

pub struct Harness {
    pub manager: WatchManager<SledStubTypeConfig>,
    pub sink: Arc<SledEventSink>,
    pub source: Arc<ChannelEventSource>,
}

pub fn open_harness(db_root: &Path) -> Harness {
    let db = Arc::new(init_sled_db(db_root, 4 * 1024 * 1024).expect("open sled"));
    let namespaces = Arc::new(SledNamespaceRegistry::new(db.clone()).expect("open registry"));
    let sink = Arc::new(SledEventSink::new(db).expect("open sink"));
    let source = Arc::new(ChannelEventSource::default());
    let manager = WatchManager::new(
        namespaces,
        sink.clone(),
        source.clone(),
        ReconnectPolicy {
            reconnect_delay: Duration::from_millis(10),
            resubscribe_backoff: Duration::from_millis(20),
        },
    );

    Harness {
        manager,
        sink,
        source,
    }
}

/// A well-formed upstream item; `second` orders items by `last_seen`.
pub fn raw_event(
    uid: &str,
    event_type: &str,
    second: i64,
) -> RawEvent {
    RawEvent {
        uid: Some(uid.to_string()),
        name: Some(format!("{uid}.17c")),
        reason: Some("FailedScheduling".to_string()),
        message: Some("0/3 nodes are available".to_string()),
        event_type: Some(event_type.to_string()),
        involved_kind: Some("Pod".to_string()),
        involved_name: Some("api-0".to_string()),
        last_timestamp: Utc.timestamp_opt(1_700_000_000 + second, 0).single(),
        count: Some(1),
        ..Default::default()
    }
}

pub async fn wait_until<F>(mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = Instant::now() + WAIT;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        sleep(Duration::from_millis(5)).await;
    }
    condition()
}

static LOGGER_INIT: once_cell::sync::Lazy<()> = once_cell::sync::Lazy::new(|| {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
});

pub fn enable_logger() {
    *LOGGER_INIT;
    println!("setup logger for integration test.");
}
