//! The forward loop of a single namespace.
//!
//! ```text
//! Connecting --subscribe ok--> Streaming --stream ended--> Reconnecting
//!                                  ^                           |
//!                                  +-------subscribe ok--------+
//!
//! any state --cancelled--> Stopped
//! ```
//!
//! Reconnecting waits `reconnect_delay` before the first attempt and
//! `resubscribe_backoff` between failed attempts, retrying until cancelled.
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::trace;
use tracing::warn;

use crate::alias::KOF;
use crate::alias::SOF;
use crate::metrics::DROP_REASON_MALFORMED;
use crate::metrics::DROP_REASON_SINK_ERROR;
use crate::metrics::DROP_REASON_STREAM_ERROR;
use crate::Event;
use crate::EventSink;
use crate::EventSource;
use crate::RawEvent;
use crate::RawEventStream;
use crate::Result;
use crate::TypeConfig;
use crate::WatchConfig;
use crate::EVENTS_DROPPED;
use crate::EVENTS_FORWARDED;
use crate::WATCH_RECONNECTS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    Connecting,
    Streaming,
    Reconnecting,
    Stopped,
}

/// Pacing of re-subscriptions after the upstream closes a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Pause before the first re-subscribe attempt
    pub reconnect_delay: Duration,
    /// Pause between failed re-subscribe attempts
    pub resubscribe_backoff: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            reconnect_delay: Duration::from_secs(1),
            resubscribe_backoff: Duration::from_secs(5),
        }
    }
}

impl From<&WatchConfig> for ReconnectPolicy {
    fn from(config: &WatchConfig) -> Self {
        Self {
            reconnect_delay: config.reconnect_delay(),
            resubscribe_backoff: config.resubscribe_backoff(),
        }
    }
}

/// How a single subscription came to an end.
#[derive(Debug, PartialEq, Eq)]
enum StreamEnd {
    Closed,
    Cancelled,
}

pub(crate) struct NamespaceWatch<T: TypeConfig> {
    namespace: String,
    source: Arc<SOF<T>>,
    sink: Arc<KOF<T>>,
    policy: ReconnectPolicy,
    token: CancellationToken,
    state: WatchState,
}

impl<T: TypeConfig> NamespaceWatch<T> {
    pub(crate) fn new(
        namespace: impl Into<String>,
        source: Arc<SOF<T>>,
        sink: Arc<KOF<T>>,
        policy: ReconnectPolicy,
        token: CancellationToken,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            source,
            sink,
            policy,
            token,
            state: WatchState::Connecting,
        }
    }

    #[cfg(test)]
    pub(crate) fn state(&self) -> WatchState {
        self.state
    }

    /// Opens the first subscription. Nothing is retried here: a failure is
    /// for the caller to report.
    pub(crate) async fn connect(&mut self) -> Result<RawEventStream> {
        self.transition(WatchState::Connecting);
        self.source.subscribe(&self.namespace, self.token.clone()).await
    }

    /// Forwards `stream` and every stream that replaces it until the
    /// watch is cancelled.
    pub(crate) async fn run(
        mut self,
        mut stream: RawEventStream,
    ) {
        loop {
            self.transition(WatchState::Streaming);

            if self.drain(&mut stream).await == StreamEnd::Cancelled {
                break;
            }

            info!(namespace = %self.namespace, "upstream closed the event stream");
            self.transition(WatchState::Reconnecting);

            match self.resubscribe().await {
                Some(next) => {
                    WATCH_RECONNECTS.with_label_values(&[self.namespace.as_str()]).inc();
                    stream = next;
                }
                None => break,
            }
        }

        drop(stream);
        self.transition(WatchState::Stopped);
    }

    async fn drain(
        &self,
        stream: &mut RawEventStream,
    ) -> StreamEnd {
        loop {
            let item = tokio::select! {
                // Cancellation wins over items already buffered upstream
                biased;
                _ = self.token.cancelled() => return StreamEnd::Cancelled,
                item = stream.next() => item,
            };

            match item {
                None => return StreamEnd::Closed,
                Some(Err(e)) => {
                    warn!(namespace = %self.namespace, "skipping event stream error: {:?}", e);
                    self.dropped(DROP_REASON_STREAM_ERROR);
                }
                Some(Ok(raw)) => self.forward(raw).await,
            }
        }
    }

    /// Saves one item. The save completes before the next item is received,
    /// which keeps per-namespace delivery order.
    async fn forward(
        &self,
        raw: RawEvent,
    ) {
        let event = match Event::from_raw(&self.namespace, raw) {
            Ok(event) => event,
            Err(e) => {
                warn!(namespace = %self.namespace, "skipping malformed event: {:?}", e);
                self.dropped(DROP_REASON_MALFORMED);
                return;
            }
        };

        match self.sink.save(&event).await {
            Ok(()) => {
                trace!(namespace = %self.namespace, id = %event.id, "event saved");
                EVENTS_FORWARDED.with_label_values(&[self.namespace.as_str()]).inc();
            }
            Err(e) => {
                error!(
                    namespace = %self.namespace,
                    id = %event.id,
                    "failed to save event, dropping it: {:?}",
                    e
                );
                self.dropped(DROP_REASON_SINK_ERROR);
            }
        }
    }

    /// Returns `None` once the watch is cancelled.
    async fn resubscribe(&self) -> Option<RawEventStream> {
        let mut pause = self.policy.reconnect_delay;

        loop {
            tokio::select! {
                biased;
                _ = self.token.cancelled() => return None,
                _ = sleep(pause) => {}
            }

            let attempt = tokio::select! {
                biased;
                _ = self.token.cancelled() => return None,
                result = self.source.subscribe(&self.namespace, self.token.clone()) => result,
            };

            match attempt {
                Ok(stream) => {
                    debug!(namespace = %self.namespace, "event stream reopened");
                    return Some(stream);
                }
                Err(e) => {
                    pause = self.policy.resubscribe_backoff;
                    warn!(
                        namespace = %self.namespace,
                        "failed to reopen event stream, retrying in {:?}: {:?}",
                        pause,
                        e
                    );
                }
            }
        }
    }

    fn dropped(
        &self,
        reason: &str,
    ) {
        EVENTS_DROPPED.with_label_values(&[self.namespace.as_str(), reason]).inc();
    }

    fn transition(
        &mut self,
        next: WatchState,
    ) {
        if self.state != next {
            debug!(namespace = %self.namespace, from = ?self.state, to = ?next, "watch state changed");
        }
        self.state = next;
    }
}
