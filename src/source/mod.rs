//! Upstream event sources.
//!
//! A source turns "watch namespace X" into a lazy, unbounded stream of raw
//! items that ends when the upstream closes it or the subscription's
//! cancellation token fires. Reconnecting is the caller's job.
mod kube_source;

pub use kube_source::*;

use async_trait::async_trait;
use futures::stream::BoxStream;
use tokio_util::sync::CancellationToken;

use crate::RawEvent;
use crate::Result;

/// Items of one open subscription. An `Err` item reports a problem with a
/// single upstream item, not the end of the stream.
pub type RawEventStream = BoxStream<'static, Result<RawEvent>>;

#[async_trait]
pub trait EventSource: Send + Sync + 'static {
    /// Opens a subscription to the events of `namespace`.
    ///
    /// Fails when the subscription cannot be established. The returned
    /// stream stops yielding once `cancel` is cancelled.
    async fn subscribe(
        &self,
        namespace: &str,
        cancel: CancellationToken,
    ) -> Result<RawEventStream>;
}
