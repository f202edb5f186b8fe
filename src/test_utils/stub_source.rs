use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_util::sync::CancellationToken;

use super::wait_until;
use crate::EventSource;
use crate::RawEvent;
use crate::RawEventStream;
use crate::Result;
use crate::SourceError;

type Feed = mpsc::UnboundedSender<Result<RawEvent>>;

#[derive(Default)]
struct StubState {
    /// Sender side of the latest subscription per namespace
    feeds: HashMap<String, Feed>,
    subscribe_calls: HashMap<String, usize>,
    pending_failures: HashMap<String, usize>,
}

/// In-process event source driven by the test.
///
/// Every successful `subscribe` opens a fresh channel; `emit` pushes into
/// the latest one and `close` ends it as if the upstream had hung up.
#[derive(Default)]
pub struct StubEventSource {
    state: Mutex<StubState>,
}

impl StubEventSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `n` subscribe calls for `namespace` fail.
    pub fn fail_next_subscribes(
        &self,
        namespace: &str,
        n: usize,
    ) {
        self.state.lock().pending_failures.insert(namespace.to_string(), n);
    }

    /// Subscribe calls for `namespace`, failed ones included.
    pub fn subscribe_calls(
        &self,
        namespace: &str,
    ) -> usize {
        self.state
            .lock()
            .subscribe_calls
            .get(namespace)
            .copied()
            .unwrap_or_default()
    }

    /// Returns false when no live subscription received the item.
    pub fn emit(
        &self,
        namespace: &str,
        raw: RawEvent,
    ) -> bool {
        self.send(namespace, Ok(raw))
    }

    pub fn emit_error(
        &self,
        namespace: &str,
        message: &str,
    ) -> bool {
        self.send(namespace, Err(SourceError::Stream(message.to_string()).into()))
    }

    /// Ends the current stream of `namespace`.
    pub fn close(
        &self,
        namespace: &str,
    ) {
        self.state.lock().feeds.remove(namespace);
    }

    /// Whether the latest subscription of `namespace` still has a reader.
    pub fn is_streaming(
        &self,
        namespace: &str,
    ) -> bool {
        self.state
            .lock()
            .feeds
            .get(namespace)
            .map(|feed| !feed.is_closed())
            .unwrap_or(false)
    }

    pub async fn wait_for_subscribe_calls(
        &self,
        namespace: &str,
        calls: usize,
    ) -> bool {
        wait_until(Duration::from_secs(2), || self.subscribe_calls(namespace) >= calls).await
    }

    fn send(
        &self,
        namespace: &str,
        item: Result<RawEvent>,
    ) -> bool {
        match self.state.lock().feeds.get(namespace) {
            Some(feed) => feed.send(item).is_ok(),
            None => false,
        }
    }
}

#[async_trait]
impl EventSource for StubEventSource {
    async fn subscribe(
        &self,
        namespace: &str,
        cancel: CancellationToken,
    ) -> Result<RawEventStream> {
        let mut state = self.state.lock();
        *state.subscribe_calls.entry(namespace.to_string()).or_default() += 1;

        if let Some(remaining) = state.pending_failures.get_mut(namespace) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(SourceError::Subscribe {
                    namespace: namespace.to_string(),
                    source: "injected subscribe failure".into(),
                }
                .into());
            }
        }

        let (tx, rx) = mpsc::unbounded_channel();
        state.feeds.insert(namespace.to_string(), tx);

        Ok(UnboundedReceiverStream::new(rx)
            .take_until(async move { cancel.cancelled().await })
            .boxed())
    }
}
